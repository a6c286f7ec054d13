//! Assembles decomposed URLs into one rectangular table.
//!
//! Records differ in shape (path depth, query parameter names), so the
//! column set is the union over all records and missing cells are null.

use crate::splitter::UrlRecord;

pub const URL_COLUMN: &str = "url";
pub const LAST_SEGMENT_COLUMN: &str = "last_segment";
pub const SEGMENT_PREFIX: &str = "segment_";
pub const QUERY_PREFIX: &str = "query_";

const BASE_COLUMNS: [&str; 5] = ["scheme", "netloc", "path", "query", "fragment"];

/// One table row. `source` is the input URL as supplied and is used as the
/// join key; it is not a column.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRow {
    pub source: String,
    pub cells: Vec<Option<String>>,
}

/// Uniform table over every input URL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlTable {
    columns: Vec<String>,
    rows: Vec<UrlRow>,
    segment_count: usize,
}

impl UrlTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[UrlRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of `segment_*` columns.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`; `None` for null cells and unknown columns.
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.cells.get(idx)?.as_deref()
    }

    /// Segment `n` (1-based) of `row`.
    pub fn segment(&self, row: usize, n: usize) -> Option<&str> {
        self.value(row, &format!("{SEGMENT_PREFIX}{n}"))
    }
}

/// Builds a [`UrlTable`] from records of any shape.
///
/// Column order: `url`, the base fields (`host`/`port` only when some record
/// has them), `segment_1..segment_k` with `last_segment`, then the `query_*`
/// columns, most populated first.
pub fn assemble(records: &[UrlRecord]) -> UrlTable {
    let with_host = records.iter().any(|r| r.host.is_some());
    let with_port = records.iter().any(|r| r.port.is_some());
    let segment_count = records.iter().map(|r| r.segments.len()).max().unwrap_or(0);
    let query_columns = rank_query_columns(records);

    let mut columns: Vec<String> = Vec::new();
    columns.push(URL_COLUMN.to_string());
    columns.extend(BASE_COLUMNS.iter().map(|c| c.to_string()));
    if with_host {
        columns.push("host".to_string());
    }
    if with_port {
        columns.push("port".to_string());
    }
    if segment_count > 0 {
        columns.extend((1..=segment_count).map(|n| format!("{SEGMENT_PREFIX}{n}")));
        columns.push(LAST_SEGMENT_COLUMN.to_string());
    }
    columns.extend(query_columns.iter().cloned());

    let rows = records
        .iter()
        .map(|record| {
            let mut cells = vec![
                Some(record.url.clone()),
                Some(record.scheme.clone()),
                Some(record.netloc.clone()),
                Some(record.path.clone()),
                Some(record.query.clone()),
                Some(record.fragment.clone()),
            ];
            if with_host {
                cells.push(record.host.clone());
            }
            if with_port {
                cells.push(record.port.map(|p| p.to_string()));
            }
            if segment_count > 0 {
                let segments: Vec<Option<String>> = (0..segment_count)
                    .map(|i| record.segments.get(i).cloned())
                    .collect();
                let last = last_non_null(&segments);
                cells.extend(segments);
                cells.push(last);
            }
            for column in &query_columns {
                let value = record
                    .query_params
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, v)| v.clone());
                cells.push(value);
            }

            UrlRow {
                source: record.source.clone(),
                cells,
            }
        })
        .collect();

    UrlTable {
        columns,
        rows,
        segment_count,
    }
}

/// Scans right to left for the first non-null cell.
fn last_non_null(cells: &[Option<String>]) -> Option<String> {
    cells.iter().rev().find_map(|c| c.clone())
}

/// Query columns sorted by descending non-null count. The sort is stable, so
/// ties keep their first-appearance order.
fn rank_query_columns(records: &[UrlRecord]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        for (name, _) in &record.query_params {
            match counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name.clone(), 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::split;

    fn table(urls: &[&str]) -> UrlTable {
        let records: Vec<UrlRecord> = urls.iter().map(|u| split(u, true).unwrap()).collect();
        assemble(&records)
    }

    #[test]
    fn test_scenario_two_urls() {
        let t = table(&["https://ex.com/a/b?x=1", "https://ex.com/a/c"]);

        assert_eq!(t.len(), 2);
        assert_eq!(t.segment(0, 1), Some("a"));
        assert_eq!(t.segment(1, 1), Some("a"));
        assert_eq!(t.segment(0, 2), Some("b"));
        assert_eq!(t.segment(1, 2), Some("c"));
        assert_eq!(t.value(0, "query_x"), Some("1"));
        assert_eq!(t.value(1, "query_x"), None);
    }

    #[test]
    fn test_column_order() {
        let t = table(&["https://ex.com/a/b?x=1", "https://ex.com/a/c"]);
        assert_eq!(
            t.columns(),
            &[
                "url",
                "scheme",
                "netloc",
                "path",
                "query",
                "fragment",
                "segment_1",
                "segment_2",
                "last_segment",
                "query_x",
            ]
        );
    }

    #[test]
    fn test_every_column_in_every_row() {
        let t = table(&[
            "https://ex.com/",
            "http://ex.com:8080/a/b/c/d?utm=x",
            "https://ex.com/a?ref=1&utm=y",
        ]);

        assert_eq!(t.len(), 3);
        for row in t.rows() {
            assert_eq!(row.cells.len(), t.columns().len());
        }
        assert!(t.column_index("host").is_some());
        assert!(t.column_index("port").is_some());
        assert_eq!(t.segment_count(), 4);
        assert_eq!(t.value(0, "port"), None);
        assert_eq!(t.value(1, "port"), Some("8080"));
    }

    #[test]
    fn test_query_columns_ranked_by_fill_rate() {
        let t = table(&[
            "https://ex.com/?a=1&b=1",
            "https://ex.com/?b=2&c=1",
            "https://ex.com/?c=2&b=3",
        ]);
        let queries: Vec<&str> = t
            .columns()
            .iter()
            .filter(|c| c.starts_with(QUERY_PREFIX))
            .map(String::as_str)
            .collect();
        assert_eq!(queries, vec!["query_b", "query_c", "query_a"]);
    }

    #[test]
    fn test_last_segment_tracks_deepest_segment() {
        let t = table(&["https://ex.com/a/b/c", "https://ex.com/x", "https://ex.com/"]);

        assert_eq!(t.value(0, LAST_SEGMENT_COLUMN), Some("c"));
        assert_eq!(t.value(1, LAST_SEGMENT_COLUMN), Some("x"));
        assert_eq!(t.value(2, LAST_SEGMENT_COLUMN), None);

        for row in 0..t.len() {
            let deepest = (1..=t.segment_count()).rev().find_map(|n| t.segment(row, n));
            assert_eq!(t.value(row, LAST_SEGMENT_COLUMN), deepest);
        }
    }

    #[test]
    fn test_no_query_or_segment_columns_when_absent() {
        let t = table(&["https://ex.com/", "https://ex.com"]);
        assert!(t.columns().iter().all(|c| !c.starts_with(QUERY_PREFIX)));
        assert!(t.columns().iter().all(|c| !c.starts_with(SEGMENT_PREFIX)));
        assert_eq!(t.column_index(LAST_SEGMENT_COLUMN), None);
    }

    #[test]
    fn test_url_column_respects_decode_flag() {
        let raw = "https://ex.com/caf%C3%A9";
        let decoded = assemble(&[split(raw, true).unwrap()]);
        let kept = assemble(&[split(raw, false).unwrap()]);

        assert_eq!(decoded.value(0, URL_COLUMN), Some("https://ex.com/café"));
        assert_eq!(kept.value(0, URL_COLUMN), Some(raw));
        assert_eq!(decoded.rows()[0].source, raw);
    }
}
