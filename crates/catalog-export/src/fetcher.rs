//! Leaf category fetching
//!
//! Every leaf of the taxonomy costs exactly one filters request. The response
//! is validated and the items of the category group become extra rows under
//! the leaf. Failures stay local: they are logged, the leaf simply gets no
//! subcategory rows, and the rest of the traversal carries on.

use crate::config::ExportConfig;
use crate::counter::RequestCounter;
use crate::models::{CategoryNode, FilterSet};
use crate::progress;
use crate::schema::{validate_filters, SchemaError};
use crate::sink::RowSink;
use async_trait::async_trait;
use catalog_common::types::CategoryRow;
use indicatif::ProgressBar;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// The request for a leaf could not be completed
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("leaf has no {0} to build a request from")]
    MissingLocator(&'static str),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream answered with status {0}")]
    Status(StatusCode),

    #[error("request gate closed")]
    GateClosed,
}

/// Why a leaf produced no subcategory rows
#[derive(Error, Debug)]
pub enum LeafError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchFailure),

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),
}

impl From<reqwest::Error> for LeafError {
    fn from(err: reqwest::Error) -> Self {
        LeafError::Fetch(FetchFailure::Transport(err))
    }
}

/// Source of filters responses for leaf categories
#[async_trait]
pub trait FilterSource: Send + Sync {
    /// Perform one request for `node` and return the validated response
    async fn fetch_filters(&self, node: &CategoryNode) -> Result<FilterSet, LeafError>;

    /// Request target for `node`, used in log lines
    fn locate(&self, node: &CategoryNode) -> Option<String> {
        let _ = node;
        None
    }
}

/// Filters API over HTTP
pub struct HttpFilterSource {
    client: Client,
    config: Arc<ExportConfig>,
}

impl HttpFilterSource {
    pub fn new(client: Client, config: Arc<ExportConfig>) -> Self {
        Self { client, config }
    }

    fn request_url(&self, node: &CategoryNode) -> Result<String, FetchFailure> {
        let shard = node.shard.as_deref().ok_or(FetchFailure::MissingLocator("shard"))?;
        let query = node.query.as_deref().ok_or(FetchFailure::MissingLocator("query"))?;
        Ok(self.config.filters_url(shard, query))
    }
}

#[async_trait]
impl FilterSource for HttpFilterSource {
    async fn fetch_filters(&self, node: &CategoryNode) -> Result<FilterSet, LeafError> {
        let url = self.request_url(node)?;

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status).into());
        }

        let body = response.bytes().await?;
        Ok(validate_filters(&body)?)
    }

    fn locate(&self, node: &CategoryNode) -> Option<String> {
        self.request_url(node).ok()
    }
}

/// Result of one leaf fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOutcome {
    /// The response was valid; this many item rows were written
    Extracted(usize),
    /// The request or validation failed; nothing was written
    Failed,
}

/// Fetches leaves and writes their subcategory items into a sink
pub struct LeafFetcher {
    source: Arc<dyn FilterSource>,
    counter: Arc<RequestCounter>,
    gate: Option<Semaphore>,
    group_name: String,
    default_depth: u32,
    progress: ProgressBar,
}

impl LeafFetcher {
    pub fn new(
        source: Arc<dyn FilterSource>,
        counter: Arc<RequestCounter>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            source,
            counter,
            gate: config.fetch_limit().map(Semaphore::new),
            group_name: config.category_group_name.clone(),
            default_depth: config.default_depth,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn counter(&self) -> &Arc<RequestCounter> {
        &self.counter
    }

    /// Fetch `node`'s filters and append one row per category item to `sink`
    /// with `parent_id` as parent.
    ///
    /// The request counter is incremented exactly once, after everything
    /// else, whatever the outcome.
    pub async fn fetch(&self, node: &CategoryNode, sink: &RowSink, parent_id: u64) -> LeafOutcome {
        let outcome = match self.request(node).await {
            Ok(filters) => {
                let written = self.write_items(&filters, sink, parent_id);
                debug!(leaf = %node.name, items = written, "Leaf expanded");
                LeafOutcome::Extracted(written)
            }
            Err(err) => {
                warn!(
                    leaf = %node.describe(),
                    request = %self.source.locate(node).unwrap_or_else(|| "-".to_string()),
                    error = %err,
                    "Unexpected response for leaf category"
                );
                LeafOutcome::Failed
            }
        };

        let total = self.counter.increment();
        progress::report_attempt(&self.progress, total);
        outcome
    }

    async fn request(&self, node: &CategoryNode) -> Result<FilterSet, LeafError> {
        let _permit = match &self.gate {
            Some(gate) => Some(gate.acquire().await.map_err(|_| FetchFailure::GateClosed)?),
            None => None,
        };
        self.source.fetch_filters(node).await
    }

    fn write_items(&self, filters: &FilterSet, sink: &RowSink, parent_id: u64) -> usize {
        let mut written = 0;
        for item in filters.items_in(&self.group_name) {
            sink.append(CategoryRow::new(
                item.id,
                item.name.clone(),
                item.depth.unwrap_or(self.default_depth),
                parent_id,
            ));
            written += 1;
        }
        written
    }
}
