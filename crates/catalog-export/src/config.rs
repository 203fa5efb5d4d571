//! Export configuration
//!
//! Everything the exporter needs from the outside world lives here, including
//! the outbound request headers. The value is built once in `main` and passed
//! down explicitly.

use catalog_common::{ExportError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Export Configuration Constants
// ============================================================================

/// Root taxonomy document.
pub const DEFAULT_CATALOG_URL: &str =
    "https://static-basket-01.wbbasket.ru/vol0/data/main-menu-by-ru-v2.json";

/// Base of the per-leaf filters API; the leaf's shard is appended to it.
pub const DEFAULT_FILTERS_BASE_URL: &str = "https://catalog.wb.ru/catalog";

pub const DEFAULT_APP_TYPE: &str = "1";
pub const DEFAULT_CURRENCY: &str = "rub";
pub const DEFAULT_DESTINATION: &str = "-59202";

/// Directory receiving one CSV file per top-level category.
pub const DEFAULT_OUTPUT_DIR: &str = "./categories";

/// Upper bound on leaf requests in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 64;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Depth written for subcategory items whose response carries no depth.
pub const DEFAULT_ITEM_DEPTH: u32 = 99;

/// Name of the filter group whose items become subcategory rows.
pub const DEFAULT_CATEGORY_GROUP: &str = "Category";

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// URL of the root taxonomy document
    pub catalog_url: String,

    /// Base URL of the filters API
    pub filters_base_url: String,

    /// `appType` query parameter sent with every leaf request
    pub app_type: String,

    /// `curr` query parameter sent with every leaf request
    pub currency: String,

    /// `dest` query parameter sent with every leaf request
    pub destination: String,

    /// Directory the workbook is written into
    pub output_dir: PathBuf,

    /// Leaf requests allowed in flight at once (0 = unbounded)
    pub max_concurrent_fetches: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Depth assigned to items that omit one
    pub default_depth: u32,

    /// Filter group consumed from each leaf response
    pub category_group_name: String,

    /// Headers sent with every outbound request
    pub headers: BTreeMap<String, String>,

    /// Draw a spinner with the running request count
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            filters_base_url: DEFAULT_FILTERS_BASE_URL.to_string(),
            app_type: DEFAULT_APP_TYPE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_depth: DEFAULT_ITEM_DEPTH,
            category_group_name: DEFAULT_CATEGORY_GROUP.to_string(),
            headers: default_headers(),
            show_progress: false,
        }
    }
}

/// Browser-like headers the upstream expects
fn default_headers() -> BTreeMap<String, String> {
    [
        ("Accept", "*/*"),
        ("Accept-Language", "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        ("Origin", "https://www.wildberries.ru"),
        ("Referer", "https://www.wildberries.ru/"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "cross-site"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
        ),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `.env` (if any) and then the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load config from environment variables
    ///
    /// Environment variables:
    /// - `CATALOG_URL`: root taxonomy document
    /// - `CATALOG_FILTERS_URL`: base URL of the filters API
    /// - `CATALOG_APP_TYPE`, `CATALOG_CURRENCY`, `CATALOG_DESTINATION`: fixed leaf query parameters
    /// - `CATALOG_OUTPUT_DIR`: output directory
    /// - `CATALOG_MAX_CONCURRENT`: leaf requests in flight (0 = unbounded)
    /// - `CATALOG_TIMEOUT_SECS`: per-request timeout
    /// - `CATALOG_DEFAULT_DEPTH`: depth for items without one
    /// - `CATALOG_GROUP_NAME`: filter group to export
    /// - `CATALOG_HEADERS_FILE`: JSON object replacing the default headers
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CATALOG_URL") {
            config.catalog_url = url;
        }

        if let Ok(url) = std::env::var("CATALOG_FILTERS_URL") {
            config.filters_base_url = url;
        }

        if let Ok(app_type) = std::env::var("CATALOG_APP_TYPE") {
            config.app_type = app_type;
        }

        if let Ok(currency) = std::env::var("CATALOG_CURRENCY") {
            config.currency = currency;
        }

        if let Ok(destination) = std::env::var("CATALOG_DESTINATION") {
            config.destination = destination;
        }

        if let Ok(dir) = std::env::var("CATALOG_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Ok(value) = std::env::var("CATALOG_MAX_CONCURRENT") {
            config.max_concurrent_fetches = parse_var("CATALOG_MAX_CONCURRENT", &value)?;
        }

        if let Ok(value) = std::env::var("CATALOG_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_var("CATALOG_TIMEOUT_SECS", &value)?;
        }

        if let Ok(value) = std::env::var("CATALOG_DEFAULT_DEPTH") {
            config.default_depth = parse_var("CATALOG_DEFAULT_DEPTH", &value)?;
        }

        if let Ok(name) = std::env::var("CATALOG_GROUP_NAME") {
            config.category_group_name = name;
        }

        if let Ok(path) = std::env::var("CATALOG_HEADERS_FILE") {
            config.headers = read_headers_file(Path::new(&path))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    pub fn with_filters_base_url(mut self, url: impl Into<String>) -> Self {
        self.filters_base_url = url.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    pub fn with_default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }

    pub fn with_category_group_name(mut self, name: impl Into<String>) -> Self {
        self.category_group_name = name.into();
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Reject values the exporter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.catalog_url.trim().is_empty() {
            return Err(ExportError::config("catalog URL is empty"));
        }
        if self.filters_base_url.trim().is_empty() {
            return Err(ExportError::config("filters base URL is empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExportError::config("request timeout must be at least one second"));
        }
        if self.category_group_name.is_empty() {
            return Err(ExportError::config("category group name is empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Concurrency gate size, `None` when unbounded
    pub fn fetch_limit(&self) -> Option<usize> {
        (self.max_concurrent_fetches > 0).then_some(self.max_concurrent_fetches)
    }

    /// Filters API URL for one leaf
    ///
    /// `query` is an already encoded fragment such as `cat=8126` and is
    /// inserted verbatim.
    pub fn filters_url(&self, shard: &str, query: &str) -> String {
        format!(
            "{}/{}/v4/filters?appType={}&{}&curr={}&dest={}",
            self.filters_base_url.trim_end_matches('/'),
            shard,
            self.app_type,
            query,
            self.currency,
            self.destination
        )
    }

    /// Configured headers as a `HeaderMap`
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ExportError::config(format!("invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                ExportError::config(format!("invalid value for header '{}': {}", name, e))
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ExportError::config(format!("{} has invalid value '{}': {}", name, value, e)))
}

fn read_headers_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExportError::config(format!("cannot read headers file '{}': {}", path.display(), e))
    })?;
    let headers = serde_json::from_str(&content).map_err(|e| {
        ExportError::config(format!(
            "headers file '{}' must be a JSON object of strings: {}",
            path.display(),
            e
        ))
    })?;
    Ok(headers)
}
