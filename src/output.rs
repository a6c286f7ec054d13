//! Output formatting and persistence for analysis results.
//!
//! Tables are written as CSV, the summary as JSON; any file can be gzip
//! compressed on the way out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::analyzers::distribution::path_label;
use crate::analyzers::types::{AnalysisReport, DistributionTable, LevelAggregate};
use crate::error::Result;
use crate::table::UrlTable;

/// Writes the URL table as CSV. Null cells are empty.
pub fn write_url_table<W: Write>(writer: W, table: &UrlTable) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.cells.iter().map(|c| c.as_deref().unwrap_or_default()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one directory level as CSV.
pub fn write_level<W: Write>(writer: W, level: &LevelAggregate) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(level.columns())?;
    for row in &level.rows {
        let mut record: Vec<String> = row
            .segments
            .iter()
            .map(|s| s.clone().unwrap_or_default())
            .collect();
        record.push(row.clicks_sum.to_string());
        record.push(optional(row.click_share));
        record.push(row.impressions_sum.to_string());
        record.push(optional(row.ctr));
        record.push(row.url_count.to_string());
        record.push(row.clicks_per_url.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one click distribution as CSV.
pub fn write_distribution<W: Write>(writer: W, distribution: &DistributionTable) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(DistributionTable::COLUMNS)?;
    for row in &distribution.rows {
        wtr.write_record([row.label.clone(), row.click_share.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes every table of `report` plus `report.json` into `dir`.
///
/// Returns the paths written, in a fixed order.
#[tracing::instrument(skip(report), fields(dir = %dir.display()))]
pub fn write_report(dir: &Path, report: &AnalysisReport, gzip: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let mut buf = Vec::new();
    write_url_table(&mut buf, &report.url_table)?;
    written.push(persist(dir, "urls.csv", buf, gzip)?);

    for level in &report.levels {
        let mut buf = Vec::new();
        write_level(&mut buf, level)?;
        written.push(persist(dir, &format!("dir_{}.csv", level.depth), buf, gzip)?);
    }

    for distribution in &report.distributions {
        let mut buf = Vec::new();
        write_distribution(&mut buf, distribution)?;
        let name = format!("distribution_{}.csv", distribution.depth);
        written.push(persist(dir, &name, buf, gzip)?);
    }

    let json = serde_json::to_vec_pretty(&report.document())?;
    written.push(persist(dir, "report.json", json, gzip)?);

    info!(files = written.len(), gzip, "Report written");
    Ok(written)
}

/// Writes `contents` to `dir/name`, appending `.gz` and compressing when asked.
fn persist(dir: &Path, name: &str, contents: Vec<u8>, gzip: bool) -> Result<PathBuf> {
    let (path, body) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&contents)?;
        (dir.join(format!("{name}.gz")), encoder.finish()?)
    } else {
        (dir.join(name), contents)
    };

    debug!(path = %path.display(), bytes = body.len(), "Writing output file");
    fs::write(&path, body)?;
    Ok(path)
}

/// Logs the top directory and average CTR of every level.
pub fn print_summary(report: &AnalysisReport) {
    for level in &report.levels {
        let top = level.rows.first();
        info!(
            depth = level.depth,
            groups = level.rows.len(),
            average_ctr = ?level.average_ctr,
            top = ?top.map(|r| path_label(&r.segments)),
            top_clicks = top.map(|r| r.clicks_sum),
            "Directory level"
        );
    }
}
