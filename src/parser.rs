//! CSV parser for search analytics landing-page exports.

use serde::Serialize;
use tracing::debug;

use crate::config::{CLICKS, HeaderAliases, IMPRESSIONS, LANDING_PAGE};
use crate::error::{AnalyzerError, Result};

/// One row of the metrics export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsRow {
    pub url: String,
    pub clicks: u64,
    pub impressions: u64,
}

/// Decodes metrics rows from raw CSV bytes.
///
/// Headers are trimmed and folded through `aliases`; columns other than the
/// landing page, clicks and impressions are ignored.
///
/// # Errors
///
/// [`AnalyzerError::Schema`] when a required column is missing,
/// [`AnalyzerError::TypeCoercion`] when clicks or impressions is not a
/// non-negative integer, [`AnalyzerError::Csv`] for malformed CSV.
pub fn parse_metrics(bytes: &[u8], aliases: &HeaderAliases) -> Result<Vec<MetricsRow>> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(bytes);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| aliases.canonical(h.trim_start_matches('\u{feff}').trim()).to_string())
        .collect();

    let position = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| AnalyzerError::Schema {
                column: column.to_string(),
                found: headers.clone(),
            })
    };
    let url_idx = position(LANDING_PAGE)?;
    let clicks_idx = position(CLICKS)?;
    let impressions_idx = position(IMPRESSIONS)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;

        rows.push(MetricsRow {
            url: record.get(url_idx).unwrap_or_default().to_string(),
            clicks: coerce(record.get(clicks_idx), row, CLICKS)?,
            impressions: coerce(record.get(impressions_idx), row, IMPRESSIONS)?,
        });
    }

    debug!(rows = rows.len(), "Parsed metrics export");
    Ok(rows)
}

fn coerce(value: Option<&str>, row: usize, column: &str) -> Result<u64> {
    let value = value.unwrap_or_default();
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| AnalyzerError::TypeCoercion {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}
