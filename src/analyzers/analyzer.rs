use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::aggregate_levels;
use crate::analyzers::distribution::summarize;
use crate::analyzers::join::join;
use crate::analyzers::types::AnalysisReport;
use crate::config::HeaderAliases;
use crate::error::{AnalyzerError, Result};
use crate::parser::{MetricsRow, parse_metrics};
use crate::splitter::{UrlRecord, split};
use crate::table::assemble;

/// Options for one run.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    /// Percent-decode URLs before splitting them.
    pub decode: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { decode: true }
    }
}

/// Runs the whole analysis over a raw CSV export.
#[tracing::instrument(skip(bytes, aliases), fields(bytes = bytes.len()))]
pub fn analyze(
    bytes: &[u8],
    aliases: &HeaderAliases,
    options: AnalyzeOptions,
) -> Result<AnalysisReport> {
    let metrics = parse_metrics(bytes, aliases)?;
    analyze_metrics(&metrics, options)
}

/// Runs the analysis over already parsed metrics rows.
///
/// Every landing page is split, the resulting table joined back onto the
/// metrics, and levels one to three aggregated and summarized. The first
/// error aborts the run.
#[tracing::instrument(skip(metrics), fields(rows = metrics.len()))]
pub fn analyze_metrics(metrics: &[MetricsRow], options: AnalyzeOptions) -> Result<AnalysisReport> {
    let records = metrics
        .iter()
        .map(|m| split(&m.url, options.decode))
        .collect::<Result<Vec<UrlRecord>>>()?;

    let url_table = assemble(&records);
    let joined = join(&url_table, metrics);
    if joined.is_empty() {
        return Err(AnalyzerError::EmptyInput);
    }

    let total_clicks = joined.total_clicks()?;
    let total_impressions = joined.total_impressions()?;
    let levels = aggregate_levels(&joined)?;
    let distributions = levels.iter().map(summarize).collect();

    info!(
        urls = url_table.len(),
        columns = url_table.columns().len(),
        clicks = total_clicks,
        impressions = total_impressions,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        url_table,
        joined,
        total_clicks,
        total_impressions,
        levels,
        distributions,
    })
}
