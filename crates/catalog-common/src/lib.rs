//! Catalog Common Library
//!
//! Shared types, logging and error handling for the catalog export workspace.
//!
//! - **Error Handling**: [`ExportError`] and the crate-wide [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Types**: the exported row shape and sheet header
//!
//! # Example
//!
//! ```no_run
//! use catalog_common::logging::{init_logging, LogConfig};
//! use catalog_common::types::CategoryRow;
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     let row = CategoryRow::new(306, "Women", 1, 0);
//!     tracing::info!(row = %row, "Built row");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{ExportError, Result};
