//! Data types used by the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::highlight::CtrHighlight;
use crate::analyzers::utility::checked_sum;
use crate::config::{CLICKS, IMPRESSIONS};
use crate::error::Result;
use crate::table::{SEGMENT_PREFIX, UrlTable};

/// A metrics row with the structure of its URL attached.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    /// Landing page as reported by the metrics export.
    pub landing_page: String,
    /// `url` column of the matching table row; `None` when unmatched.
    pub url: Option<String>,
    pub scheme: Option<String>,
    pub netloc: Option<String>,
    pub path: Option<String>,
    /// `segment_1..segment_k` of the matching row, all null when unmatched.
    pub segments: Vec<Option<String>>,
    pub clicks: u64,
    pub impressions: u64,
    /// Always 1; summed to count URLs per group.
    pub count: u64,
}

impl JoinedRow {
    /// Segment `n` (1-based); null past the deepest segment column.
    pub fn segment(&self, n: usize) -> Option<&str> {
        self.segments.get(n.checked_sub(1)?)?.as_deref()
    }

    pub fn is_matched(&self) -> bool {
        self.url.is_some()
    }
}

/// Every metrics row, in input order, with its URL structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    pub(crate) rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_clicks(&self) -> Result<u64> {
        checked_sum(self.rows.iter().map(|r| r.clicks), CLICKS)
    }

    pub fn total_impressions(&self) -> Result<u64> {
        checked_sum(self.rows.iter().map(|r| r.impressions), IMPRESSIONS)
    }

    /// Landing pages whose URL had no row in the URL table.
    pub fn unmatched_landing_pages(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| !r.is_matched())
            .map(|r| r.landing_page.as_str())
            .collect()
    }
}

/// Aggregated traffic of one directory at a given depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRow {
    /// `segment_1..segment_depth`; `None` for URLs without that segment.
    pub segments: Vec<Option<String>>,
    pub clicks_sum: u64,
    /// Share of the depth-1 click total, 3 decimals.
    pub click_share: Option<f64>,
    pub impressions_sum: u64,
    /// 3 decimals; `None` when `impressions_sum` is zero.
    pub ctr: Option<f64>,
    pub url_count: u64,
    /// 2 decimals.
    pub clicks_per_url: f64,
}

/// All directories at one depth, ranked by clicks.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAggregate {
    pub depth: usize,
    pub rows: Vec<LevelRow>,
    /// Total clicks over total impressions for the level, unrounded.
    pub average_ctr: Option<f64>,
}

impl LevelAggregate {
    /// Output column names, stable for a given depth.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = (1..=self.depth)
            .map(|n| format!("{SEGMENT_PREFIX}{n}"))
            .collect();
        columns.extend(
            [
                "clicks_sum",
                "click_share",
                "impressions_sum",
                "ctr",
                "url_count",
                "clicks_per_url",
            ]
            .map(String::from),
        );
        columns
    }

    pub fn total_clicks(&self) -> Result<u64> {
        checked_sum(self.rows.iter().map(|r| r.clicks_sum), CLICKS)
    }

    /// CTR highlight for each row, aligned with `rows`.
    pub fn highlights(&self) -> Vec<Option<CtrHighlight>> {
        self.rows
            .iter()
            .map(|r| CtrHighlight::classify(r.ctr, self.average_ctr))
            .collect()
    }
}

/// One slice of a click distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub label: String,
    pub click_share: f64,
}

/// Click distribution of one level, ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionTable {
    pub depth: usize,
    pub rows: Vec<DistributionRow>,
}

impl DistributionTable {
    pub const COLUMNS: [&'static str; 2] = ["label", "click_share"];
}

/// Complete result of one run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub url_table: UrlTable,
    pub joined: JoinedTable,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub levels: Vec<LevelAggregate>,
    pub distributions: Vec<DistributionTable>,
}

impl AnalysisReport {
    pub fn level(&self, depth: usize) -> Option<&LevelAggregate> {
        self.levels.iter().find(|l| l.depth == depth)
    }

    pub fn distribution(&self, depth: usize) -> Option<&DistributionTable> {
        self.distributions.iter().find(|d| d.depth == depth)
    }

    /// Serializable summary, written as `report.json`.
    pub fn document(&self) -> ReportDocument<'_> {
        ReportDocument {
            schema_version: 1,
            generated_at: self.generated_at,
            total_urls: self.url_table.len(),
            joined_rows: self.joined.len(),
            unmatched_landing_pages: self.joined.unmatched_landing_pages(),
            total_clicks: self.total_clicks,
            total_impressions: self.total_impressions,
            levels: self
                .levels
                .iter()
                .map(|level| LevelDocument {
                    depth: level.depth,
                    average_ctr: level.average_ctr,
                    groups: level
                        .rows
                        .iter()
                        .zip(level.highlights())
                        .map(|(row, ctr_highlight)| LevelRowDocument { row, ctr_highlight })
                        .collect(),
                    distribution: self.distribution(level.depth),
                })
                .collect(),
        }
    }
}

/// Top-level JSON report.
#[derive(Serialize)]
pub struct ReportDocument<'a> {
    pub(crate) schema_version: u8,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) total_urls: usize,
    pub(crate) joined_rows: usize,
    pub(crate) unmatched_landing_pages: Vec<&'a str>,
    pub(crate) total_clicks: u64,
    pub(crate) total_impressions: u64,
    pub(crate) levels: Vec<LevelDocument<'a>>,
}

#[derive(Serialize)]
pub struct LevelDocument<'a> {
    pub(crate) depth: usize,
    pub(crate) average_ctr: Option<f64>,
    pub(crate) groups: Vec<LevelRowDocument<'a>>,
    pub(crate) distribution: Option<&'a DistributionTable>,
}

#[derive(Serialize)]
pub struct LevelRowDocument<'a> {
    #[serde(flatten)]
    pub(crate) row: &'a LevelRow,
    pub(crate) ctr_highlight: Option<CtrHighlight>,
}
