use crate::analyzers::types::{DistributionRow, DistributionTable, LevelAggregate};

/// Label given to slices below [`OTHERS_THRESHOLD`].
pub const OTHERS_LABEL: &str = "*others";
/// Shares strictly below this are relabelled [`OTHERS_LABEL`].
pub const OTHERS_THRESHOLD: f64 = 0.005;
/// Rendering of a missing segment inside a label.
pub const NULL_SEGMENT_LABEL: &str = "(none)";

/// Turns a ranked level into a click distribution for charting.
///
/// Rows without clicks are dropped. Small slices are relabelled, not merged:
/// each keeps its own share and the chart groups equal labels.
pub fn summarize(level: &LevelAggregate) -> DistributionTable {
    let rows = level
        .rows
        .iter()
        .filter_map(|row| {
            let share = row.click_share.filter(|s| *s != 0.0)?;
            let label = if share < OTHERS_THRESHOLD {
                OTHERS_LABEL.to_string()
            } else {
                path_label(&row.segments)
            };
            Some(DistributionRow {
                label,
                click_share: share,
            })
        })
        .collect();

    DistributionTable {
        depth: level.depth,
        rows,
    }
}

/// Joins segments with `/`.
pub fn path_label(segments: &[Option<String>]) -> String {
    segments
        .iter()
        .map(|s| s.as_deref().unwrap_or(NULL_SEGMENT_LABEL))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::LevelRow;

    fn row(segments: &[Option<&str>], clicks: u64, share: Option<f64>) -> LevelRow {
        LevelRow {
            segments: segments.iter().map(|s| s.map(str::to_string)).collect(),
            clicks_sum: clicks,
            click_share: share,
            impressions_sum: clicks * 10,
            ctr: Some(0.1),
            url_count: 1,
            clicks_per_url: clicks as f64,
        }
    }

    fn level(depth: usize, rows: Vec<LevelRow>) -> LevelAggregate {
        LevelAggregate {
            depth,
            rows,
            average_ctr: Some(0.1),
        }
    }

    #[test]
    fn test_small_share_is_relabelled_not_merged() {
        let dist = summarize(&level(
            1,
            vec![
                row(&[Some("blog")], 994, Some(0.994)),
                row(&[Some("tags")], 3, Some(0.003)),
                row(&[Some("misc")], 3, Some(0.003)),
            ],
        ));

        assert_eq!(dist.rows.len(), 3);
        assert_eq!(dist.rows[0].label, "blog");
        assert_eq!(dist.rows[1].label, OTHERS_LABEL);
        assert_eq!(dist.rows[1].click_share, 0.003);
        assert_eq!(dist.rows[2].label, OTHERS_LABEL);
        assert_eq!(dist.rows[2].click_share, 0.003);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let dist = summarize(&level(1, vec![row(&[Some("edge")], 5, Some(0.005))]));
        assert_eq!(dist.rows[0].label, "edge");
    }

    #[test]
    fn test_zero_and_undefined_shares_are_dropped() {
        let dist = summarize(&level(
            1,
            vec![
                row(&[Some("a")], 10, Some(1.0)),
                row(&[Some("b")], 0, Some(0.0)),
                row(&[Some("c")], 0, None),
            ],
        ));
        assert_eq!(dist.rows.len(), 1);
        assert_eq!(dist.rows[0].label, "a");
    }

    #[test]
    fn test_deeper_labels_join_segments() {
        let dist = summarize(&level(
            3,
            vec![
                row(&[Some("shop"), Some("shoes"), Some("red")], 8, Some(0.8)),
                row(&[Some("shop"), None, None], 2, Some(0.2)),
            ],
        ));
        assert_eq!(dist.depth, 3);
        assert_eq!(dist.rows[0].label, "shop/shoes/red");
        assert_eq!(dist.rows[1].label, "shop/(none)/(none)");
    }
}
