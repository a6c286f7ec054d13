use std::collections::HashMap;

use tracing::debug;

use crate::analyzers::types::{JoinedRow, JoinedTable};
use crate::parser::MetricsRow;
use crate::table::{SEGMENT_PREFIX, URL_COLUMN, UrlTable};

/// Right-outer join of `table` onto `metrics`.
///
/// The key is exact string equality between the metrics URL and the URL each
/// table row was split from. Every metrics row survives in input order;
/// table rows without metrics are dropped. When the table holds the same URL
/// more than once the first row wins, so the result always has exactly
/// `metrics.len()` rows.
pub fn join(table: &UrlTable, metrics: &[MetricsRow]) -> JoinedTable {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        index.entry(row.source.as_str()).or_insert(i);
    }

    let segment_names: Vec<String> = (1..=table.segment_count())
        .map(|n| format!("{SEGMENT_PREFIX}{n}"))
        .collect();

    let rows: Vec<JoinedRow> = metrics
        .iter()
        .map(|m| {
            let matched = index.get(m.url.as_str()).copied();
            let cell = |name: &str| matched.and_then(|i| table.value(i, name)).map(str::to_string);

            JoinedRow {
                landing_page: m.url.clone(),
                url: cell(URL_COLUMN),
                scheme: cell("scheme"),
                netloc: cell("netloc"),
                path: cell("path"),
                segments: segment_names.iter().map(|name| cell(name.as_str())).collect(),
                clicks: m.clicks,
                impressions: m.impressions,
                count: 1,
            }
        })
        .collect();

    let unmatched = rows.iter().filter(|r| !r.is_matched()).count();
    debug!(rows = rows.len(), unmatched, "Joined URL table with metrics");

    JoinedTable { rows }
}
