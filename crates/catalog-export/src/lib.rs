//! Catalog Export Library
//!
//! Flattens a remote category taxonomy into one sheet per top-level category.
//! Leaf categories are expanded with the subcategory items reported by the
//! filters API, one request per leaf.
//!
//! # Pipeline
//!
//! - [`client::CatalogClient`] fetches the root taxonomy
//! - [`walker::TreeWalker`] walks each top-level category concurrently
//! - [`fetcher::LeafFetcher`] requests and validates every leaf's filters
//! - [`sink::RowSink`] collects the rows of one sheet
//! - [`workbook::Workbook`] writes the sheets as CSV files
//! - [`orchestrator::Exporter`] ties the steps together
//!
//! # Example
//!
//! ```no_run
//! use catalog_export::{ExportConfig, Exporter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExportConfig::load()?.with_output_dir("./categories");
//!     let summary = Exporter::new(config)?.run().await?;
//!     println!("{}", summary.report());
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod client;
pub mod config;
pub mod counter;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod schema;
pub mod sink;
pub mod walker;
pub mod workbook;

pub use config::ExportConfig;
pub use orchestrator::{ExportSummary, Exporter};
