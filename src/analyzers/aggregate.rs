use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::analyzers::types::{JoinedTable, LevelAggregate, LevelRow};
use crate::analyzers::utility::{checked_sum, overflow, ratio, round_to};
use crate::config::{CLICKS, IMPRESSIONS};
use crate::error::Result;

/// Deepest directory level that is aggregated.
pub const MAX_DEPTH: usize = 3;

#[derive(Default)]
struct Sums {
    clicks: u64,
    impressions: u64,
    count: u64,
}

/// Aggregates every level from 1 to [`MAX_DEPTH`].
///
/// `click_share` at every depth is computed against the depth-1 click total,
/// not the total of its own level.
pub fn aggregate_levels(joined: &JoinedTable) -> Result<Vec<LevelAggregate>> {
    let first = aggregate(joined, 1, None)?;
    let depth_one_total = first.total_clicks()?;

    let mut levels = vec![first];
    for depth in 2..=MAX_DEPTH {
        levels.push(aggregate(joined, depth, Some(depth_one_total))?);
    }
    Ok(levels)
}

/// Groups `joined` by `segment_1..segment_depth` and ranks the groups by
/// clicks, descending.
///
/// Rows missing a segment are grouped under a null value for it. Shares are
/// taken against `share_total`, or against this level's own click total when
/// `None`.
///
/// # Errors
///
/// [`AnalyzerError::Overflow`](crate::error::AnalyzerError::Overflow) when a
/// clicks or impressions sum does not fit in a `u64`.
pub fn aggregate(
    joined: &JoinedTable,
    depth: usize,
    share_total: Option<u64>,
) -> Result<LevelAggregate> {
    let mut groups: HashMap<Vec<Option<String>>, Sums> = HashMap::new();

    for row in joined.rows() {
        let key: Vec<Option<String>> = (1..=depth)
            .map(|n| row.segment(n).map(str::to_string))
            .collect();
        let sums = groups.entry(key).or_default();
        sums.clicks = sums.clicks.checked_add(row.clicks).ok_or_else(|| overflow(CLICKS))?;
        sums.impressions = sums
            .impressions
            .checked_add(row.impressions)
            .ok_or_else(|| overflow(IMPRESSIONS))?;
        sums.count += row.count;
    }

    let total = match share_total {
        Some(total) => total,
        None => checked_sum(groups.values().map(|s| s.clicks), CLICKS)?,
    };

    let mut rows: Vec<LevelRow> = groups
        .into_iter()
        .map(|(segments, sums)| LevelRow {
            segments,
            clicks_sum: sums.clicks,
            click_share: ratio(sums.clicks, total).map(|s| round_to(s, 3)),
            impressions_sum: sums.impressions,
            ctr: ratio(sums.clicks, sums.impressions).map(|c| round_to(c, 3)),
            url_count: sums.count,
            clicks_per_url: ratio(sums.clicks, sums.count).map_or(0.0, |c| round_to(c, 2)),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.clicks_sum
            .cmp(&a.clicks_sum)
            .then_with(|| compare_keys(&a.segments, &b.segments))
    });

    let clicks = checked_sum(rows.iter().map(|r| r.clicks_sum), CLICKS)?;
    let impressions = checked_sum(rows.iter().map(|r| r.impressions_sum), IMPRESSIONS)?;
    let average_ctr = ratio(clicks, impressions);

    debug!(depth, groups = rows.len(), ?average_ctr, "Aggregated directory level");

    Ok(LevelAggregate {
        depth,
        rows,
        average_ctr,
    })
}

/// Lexicographic order with null components after every named one.
fn compare_keys(a: &[Option<String>], b: &[Option<String>]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::join::join;
    use crate::error::AnalyzerError;
    use crate::parser::MetricsRow;
    use crate::splitter::split;
    use crate::table::assemble;

    fn joined(entries: &[(&str, u64, u64)]) -> JoinedTable {
        let records: Vec<_> = entries.iter().map(|(u, _, _)| split(u, true).unwrap()).collect();
        let metrics: Vec<MetricsRow> = entries
            .iter()
            .map(|(u, c, i)| MetricsRow {
                url: u.to_string(),
                clicks: *c,
                impressions: *i,
            })
            .collect();
        join(&assemble(&records), &metrics)
    }

    fn key(parts: &[Option<&str>]) -> Vec<Option<String>> {
        parts.iter().map(|p| p.map(str::to_string)).collect()
    }

    #[test]
    fn test_single_directory_scenario() {
        let j = joined(&[("https://ex.com/a/b", 10, 100)]);
        let levels = aggregate_levels(&j).unwrap();

        let top = &levels[0].rows[0];
        assert_eq!(top.segments, key(&[Some("a")]));
        assert_eq!(top.clicks_sum, 10);
        assert_eq!(top.ctr, Some(0.1));
        assert_eq!(top.url_count, 1);
        assert_eq!(top.clicks_per_url, 10.0);
        assert_eq!(top.click_share, Some(1.0));
    }

    #[test]
    fn test_groups_ranked_by_clicks() {
        let j = joined(&[
            ("https://ex.com/blog/a", 5, 50),
            ("https://ex.com/shop/a", 20, 100),
            ("https://ex.com/blog/b", 7, 70),
            ("https://ex.com/about", 1, 3),
        ]);
        let level = aggregate(&j, 1, None).unwrap();

        let names: Vec<_> = level.rows.iter().map(|r| r.segments[0].as_deref()).collect();
        assert_eq!(names, vec![Some("shop"), Some("blog"), Some("about")]);
        assert_eq!(level.rows[1].clicks_sum, 12);
        assert_eq!(level.rows[1].url_count, 2);
        assert_eq!(level.rows[1].clicks_per_url, 6.0);
        assert_eq!(level.rows[2].ctr, Some(0.333));
    }

    #[test]
    fn test_missing_segments_form_their_own_group() {
        let j = joined(&[
            ("https://ex.com/", 4, 40),
            ("https://ex.com/a", 2, 20),
            ("https://ex.com/a/b", 3, 30),
        ]);
        let level = aggregate(&j, 2, None).unwrap();

        assert_eq!(level.rows.len(), 3);
        assert_eq!(level.rows[0].segments, key(&[None, None]));
        assert_eq!(level.rows[1].segments, key(&[Some("a"), Some("b")]));
        assert_eq!(level.rows[2].segments, key(&[Some("a"), None]));
    }

    #[test]
    fn test_ties_put_null_groups_last() {
        let j = joined(&[
            ("https://ex.com/", 5, 10),
            ("https://ex.com/b", 5, 10),
            ("https://ex.com/a", 5, 10),
        ]);
        let level = aggregate(&j, 1, None).unwrap();
        let names: Vec<_> = level.rows.iter().map(|r| r.segments[0].as_deref()).collect();
        assert_eq!(names, vec![Some("a"), Some("b"), None]);
    }

    #[test]
    fn test_deeper_levels_share_depth_one_total() {
        let j = joined(&[
            ("https://ex.com/a/x", 30, 300),
            ("https://ex.com/a/y", 10, 100),
            ("https://ex.com/b/z", 60, 600),
        ]);
        let levels = aggregate_levels(&j).unwrap();

        assert_eq!(levels.len(), MAX_DEPTH);
        let level_two = &levels[1];
        assert_eq!(level_two.rows[0].click_share, Some(0.6));
        assert_eq!(level_two.rows[1].click_share, Some(0.3));
        assert_eq!(level_two.rows[2].click_share, Some(0.1));

        // Explicit denominator is honoured as given.
        let level = aggregate(&j, 2, Some(200)).unwrap();
        assert_eq!(level.rows[0].click_share, Some(0.3));
    }

    #[test]
    fn test_clicks_are_conserved_at_every_depth() {
        let j = joined(&[
            ("https://ex.com/", 1, 10),
            ("https://ex.com/a", 2, 10),
            ("https://ex.com/a/b", 3, 10),
            ("https://ex.com/a/b/c", 4, 10),
            ("https://ex.com/d/e/f/g", 5, 10),
        ]);
        for level in aggregate_levels(&j).unwrap() {
            assert_eq!(
                level.total_clicks().unwrap(),
                j.total_clicks().unwrap(),
                "depth {}",
                level.depth
            );
        }
    }

    #[test]
    fn test_zero_impressions_has_no_ctr() {
        let j = joined(&[("https://ex.com/a", 0, 0), ("https://ex.com/b", 3, 30)]);
        let level = aggregate(&j, 1, None).unwrap();

        let a = level.rows.iter().find(|r| r.segments[0].as_deref() == Some("a")).unwrap();
        assert_eq!(a.ctr, None);
        assert_eq!(a.click_share, Some(0.0));
        assert_eq!(level.average_ctr, Some(0.1));
    }

    #[test]
    fn test_no_clicks_has_no_share() {
        let j = joined(&[("https://ex.com/a", 0, 10)]);
        let level = aggregate(&j, 1, None).unwrap();
        assert_eq!(level.rows[0].click_share, None);
        assert_eq!(level.rows[0].ctr, Some(0.0));
    }

    #[test]
    fn test_depth_one_shares_sum_to_one() {
        let j = joined(&[
            ("https://ex.com/a", 1, 10),
            ("https://ex.com/b", 1, 10),
            ("https://ex.com/c", 1, 10),
            ("https://ex.com/d", 4, 10),
        ]);
        let level = aggregate(&j, 1, None).unwrap();
        let sum: f64 = level.rows.iter().filter_map(|r| r.click_share).sum();
        assert!((sum - 1.0).abs() <= 0.001 * level.rows.len() as f64);
    }

    #[test]
    fn test_overflowing_sums_are_reported() {
        let j = joined(&[
            ("https://ex.com/a", u64::MAX, 10),
            ("https://ex.com/a/b", 1, 10),
        ]);
        match aggregate(&j, 1, None).unwrap_err() {
            AnalyzerError::Overflow { column } => assert_eq!(column, CLICKS),
            other => panic!("unexpected error: {other}"),
        }

        let j = joined(&[
            ("https://ex.com/a", 1, u64::MAX),
            ("https://ex.com/b", 1, u64::MAX),
        ]);
        assert_eq!(
            aggregate_levels(&j).unwrap_err().kind(),
            "overflow_error"
        );
    }
}
