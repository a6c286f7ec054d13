//! CLI entry point for the directory analyzer.
//!
//! Reads a search analytics landing-page export, splits every URL into its
//! components, and reports clicks, impressions and CTR per directory for the
//! first three directory levels.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dir_analyzer::analyzers::analyzer::{AnalyzeOptions, analyze};
use dir_analyzer::config::HeaderAliases;
use dir_analyzer::fetch::load_source;
use dir_analyzer::output::{print_summary, write_report, write_url_table};
use dir_analyzer::splitter::split;
use dir_analyzer::table::assemble;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dir_analyzer")]
#[command(about = "Directory-level traffic analysis of search analytics exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a landing-page export from a file or URL
    Analyze {
        /// Path to CSV file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Directory to write the result tables to
        #[arg(short, long, default_value = "report")]
        output_dir: PathBuf,

        /// Keep percent-encoded URLs as they are instead of decoding them
        #[arg(long, default_value_t = false)]
        no_decode: bool,

        /// Gzip compress every output file
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// JSON file with extra header aliases (falls back to DIR_ANALYZER_ALIASES)
        #[arg(long)]
        aliases: Option<PathBuf>,
    },
    /// Split URLs into their components and print the table as CSV
    Split {
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,

        /// Keep percent-encoded URLs as they are instead of decoding them
        #[arg(long, default_value_t = false)]
        no_decode: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/dir_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("dir_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            output_dir,
            no_decode,
            gzip,
            aliases,
        } => {
            let aliases = load_aliases(aliases)?;
            let bytes = load_source(&source).await?;

            let options = AnalyzeOptions { decode: !no_decode };
            let report = match analyze(&bytes, &aliases, options) {
                Ok(report) => report,
                Err(e) => {
                    error!(kind = e.kind(), error = %e, "Analysis failed");
                    return Err(e.into());
                }
            };

            print_summary(&report);
            let written = write_report(&output_dir, &report, gzip)?;
            info!(
                output_dir = %output_dir.display(),
                files = written.len(),
                "Finished analysis"
            );
        }
        Commands::Split { urls, no_decode } => {
            let records = urls
                .iter()
                .map(|u| split(u, !no_decode))
                .collect::<dir_analyzer::Result<Vec<_>>>()?;
            write_url_table(std::io::stdout().lock(), &assemble(&records))?;
        }
    }

    Ok(())
}

/// Header aliases from `--aliases`, `DIR_ANALYZER_ALIASES`, or the defaults.
fn load_aliases(path: Option<PathBuf>) -> Result<HeaderAliases> {
    let path = path.or_else(|| std::env::var_os("DIR_ANALYZER_ALIASES").map(PathBuf::from));
    let aliases = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading header aliases");
            HeaderAliases::load(&path)?
        }
        None => HeaderAliases::default(),
    };
    info!(count = aliases.iter().count(), "Header aliases ready");
    Ok(aliases)
}
