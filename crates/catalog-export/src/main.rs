//! Catalog Export - taxonomy to CSV sheets

use anyhow::Result;
use catalog_common::logging::{init_logging, LogConfig, LogLevel};
use catalog_export::{ExportConfig, Exporter};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

/// Every option falls back to the `CATALOG_*` environment and then to the
/// built-in defaults, so the tool runs without arguments.
#[derive(Parser, Debug)]
#[command(name = "catalog-export")]
#[command(
    author,
    version,
    about = "Export a category taxonomy into one CSV sheet per top-level category"
)]
struct Cli {
    /// Output directory
    #[arg(short, long, env = "CATALOG_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Root taxonomy URL
    #[arg(long, env = "CATALOG_URL")]
    catalog_url: Option<String>,

    /// Filters API base URL
    #[arg(long, env = "CATALOG_FILTERS_URL")]
    filters_url: Option<String>,

    /// Leaf requests in flight at once (0 = unbounded)
    #[arg(long, env = "CATALOG_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Hide the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, mut config: ExportConfig) -> ExportConfig {
        if let Some(dir) = self.output {
            config = config.with_output_dir(dir);
        }
        if let Some(url) = self.catalog_url {
            config = config.with_catalog_url(url);
        }
        if let Some(url) = self.filters_url {
            config = config.with_filters_base_url(url);
        }
        if let Some(limit) = self.max_concurrent {
            config = config.with_max_concurrent_fetches(limit);
        }
        if let Some(secs) = self.timeout {
            config = config.with_request_timeout(secs);
        }
        config.with_progress(!self.no_progress && std::io::stderr().is_terminal())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("catalog-export")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    let config = cli.apply(ExportConfig::load()?);
    info!(
        catalog = %config.catalog_url,
        output = %config.output_dir.display(),
        max_concurrent = config.max_concurrent_fetches,
        "Starting catalog export"
    );

    let summary = Exporter::new(config)?.run().await?;

    info!("{}", summary.report());
    Ok(())
}
