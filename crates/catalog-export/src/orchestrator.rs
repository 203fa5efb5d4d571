//! Export orchestrator
//!
//! Fetches the root taxonomy, walks every top-level category concurrently into
//! its own sheet and writes the workbook once all walks have finished.

use crate::client::CatalogClient;
use crate::config::ExportConfig;
use crate::counter::RequestCounter;
use crate::fetcher::{FilterSource, HttpFilterSource, LeafFetcher};
use crate::models::CategoryNode;
use crate::progress;
use crate::walker::{TreeWalker, WalkStats};
use crate::workbook::{Workbook, WrittenSheet};
use catalog_common::{ExportError, Result};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Depth of the top-level categories
const TOP_LEVEL_DEPTH: u32 = 1;

/// Outcome of a completed export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Sheets written, in taxonomy order
    pub sheets: Vec<WrittenSheet>,
    /// Leaf requests attempted, successful or not
    pub requests: u64,
    /// Traversal counts over all top-level categories
    pub walk: WalkStats,
}

impl ExportSummary {
    pub fn rows(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows).sum()
    }

    /// Multi-line report for the end of a run
    pub fn report(&self) -> String {
        format!(
            "Export Summary:\n\
             - Sheets written: {}\n\
             - Rows written: {}\n\
             - Categories visited: {}\n\
             - Leaf requests: {}\n\
             - Failed leaf requests: {}",
            self.sheets.len(),
            self.rows(),
            self.walk.nodes,
            self.requests,
            self.walk.failed_leaves
        )
    }
}

/// Runs one export
pub struct Exporter {
    config: Arc<ExportConfig>,
    catalog: CatalogClient,
    source: Arc<dyn FilterSource>,
}

impl Exporter {
    /// Exporter talking HTTP to both the catalog and the filters API
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let catalog = CatalogClient::new(&config)?;
        let source = Arc::new(HttpFilterSource::new(catalog.http().clone(), Arc::clone(&config)));

        Ok(Self {
            config,
            catalog,
            source,
        })
    }

    /// Exporter reading leaf filters from `source`
    pub fn with_source(config: ExportConfig, source: Arc<dyn FilterSource>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let catalog = CatalogClient::new(&config)?;

        Ok(Self {
            config,
            catalog,
            source,
        })
    }

    /// Fetch the root taxonomy and export it
    pub async fn run(&self) -> Result<ExportSummary> {
        let categories = self.catalog.fetch_catalog().await?;
        self.export(categories).await
    }

    /// Export an already fetched taxonomy
    pub async fn export(&self, categories: Vec<CategoryNode>) -> Result<ExportSummary> {
        if categories.is_empty() {
            warn!("Root taxonomy has no categories");
        }

        let counter = Arc::new(RequestCounter::new());
        let spinner = progress::request_spinner(self.config.show_progress);
        let fetcher = LeafFetcher::new(Arc::clone(&self.source), Arc::clone(&counter), &self.config)
            .with_progress(spinner.clone());
        let walker = TreeWalker::new(Arc::new(fetcher));

        let mut workbook = Workbook::new();
        let mut walks = JoinSet::new();
        for category in categories {
            let sink = workbook.add_sheet(category.name.clone());
            info!(category = %category.name, "Parsing top-level category");
            walks.spawn(walker.visit(category, sink, TOP_LEVEL_DEPTH));
        }

        let mut walk = WalkStats::default();
        while let Some(joined) = walks.join_next().await {
            match joined {
                Ok(stats) => walk += stats,
                Err(err) => {
                    error!(error = %err, "Top-level traversal task failed");
                    walk.panicked_tasks += 1;
                }
            }
        }
        spinner.finish_and_clear();

        let output_dir = self.config.output_dir.clone();
        let sheets = tokio::task::spawn_blocking(move || workbook.close(&output_dir))
            .await
            .map_err(|e| ExportError::output(format!("workbook writer failed: {}", e)))??;

        let requests = counter.get();
        info!(
            requests,
            failed = walk.failed_leaves,
            sheets = sheets.len(),
            "Finished parsing. Amount of queries: {}",
            requests
        );

        Ok(ExportSummary {
            sheets,
            requests,
            walk,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fetcher::LeafError;
    use crate::models::FilterSet;
    use async_trait::async_trait;

    struct EmptySource;

    #[async_trait]
    impl FilterSource for EmptySource {
        async fn fetch_filters(
            &self,
            _node: &CategoryNode,
        ) -> std::result::Result<FilterSet, LeafError> {
            Ok(FilterSet::default())
        }
    }

    #[test]
    fn test_report() {
        let summary = ExportSummary {
            sheets: vec![WrittenSheet {
                name: "Women".to_string(),
                path: "out/Women.csv".into(),
                rows: 12,
            }],
            requests: 7,
            walk: WalkStats {
                nodes: 10,
                leaves: 7,
                failed_leaves: 2,
                item_rows: 2,
                panicked_tasks: 0,
            },
        };

        let report = summary.report();
        assert!(report.contains("Sheets written: 1"));
        assert!(report.contains("Rows written: 12"));
        assert!(report.contains("Leaf requests: 7"));
        assert!(report.contains("Failed leaf requests: 2"));
    }

    #[tokio::test]
    async fn test_export_one_sheet_per_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new().with_output_dir(dir.path());
        let exporter = Exporter::with_source(config, Arc::new(EmptySource)).unwrap();

        let categories = vec![
            CategoryNode::new(1, "Women").with_children(vec![
                CategoryNode::leaf(11, "Dresses", "s", "cat=11"),
                CategoryNode::leaf(12, "Skirts", "s", "cat=12"),
            ]),
            CategoryNode::leaf(2, "Books", "s", "cat=2"),
        ];

        let summary = exporter.export(categories).await.unwrap();

        assert_eq!(summary.sheets.len(), 2);
        assert_eq!(summary.sheets[0].name, "Women");
        assert_eq!(summary.sheets[0].rows, 3);
        assert_eq!(summary.sheets[1].rows, 1);
        assert_eq!(summary.requests, 3);
        assert_eq!(summary.walk.leaves, 3);

        let books = std::fs::read_to_string(dir.path().join("Books.csv")).unwrap();
        assert_eq!(books, "ID,Name,Depth,Parent\n2,Books,1,0\n");
    }

    #[tokio::test]
    async fn test_export_empty_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new().with_output_dir(dir.path());
        let exporter = Exporter::with_source(config, Arc::new(EmptySource)).unwrap();

        let summary = exporter.export(Vec::new()).await.unwrap();
        assert!(summary.sheets.is_empty());
        assert_eq!(summary.requests, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExportConfig::new().with_request_timeout(0);
        assert!(Exporter::new(config).is_err());
    }
}
