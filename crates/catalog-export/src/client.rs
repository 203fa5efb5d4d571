//! HTTP client for the catalog endpoints
//!
//! Builds the shared `reqwest::Client` (headers and timeout from
//! [`ExportConfig`]) and retrieves the root taxonomy document.

use crate::config::ExportConfig;
use crate::models::CategoryNode;
use catalog_common::{ExportError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Client for the root taxonomy document
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    catalog_url: String,
}

impl CatalogClient {
    /// Create a client sending the configured headers with every request
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(config.header_map()?)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
        })
    }

    /// The underlying HTTP client, shared with the leaf requests
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Fetch the root taxonomy: an array of top-level categories
    ///
    /// Nothing can be exported without it, so every failure here is returned
    /// to the caller.
    pub async fn fetch_catalog(&self) -> Result<Vec<CategoryNode>> {
        info!(url = %self.catalog_url, "Fetching root taxonomy");

        let response = self.client.get(&self.catalog_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::catalog(format!(
                "{} answered with status {}",
                self.catalog_url, status
            )));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Root taxonomy downloaded");

        let categories = parse_taxonomy(&body).map_err(|e| {
            ExportError::catalog(format!("{} is not a taxonomy document: {}", self.catalog_url, e))
        })?;

        info!(
            top_level = categories.len(),
            nodes = categories.iter().map(CategoryNode::node_count).sum::<usize>(),
            "Root taxonomy parsed"
        );
        Ok(categories)
    }
}

/// Parse a taxonomy document of any nesting depth
///
/// Every level costs serde_json two steps of its recursion limit, so the
/// limit is lifted and the stack is grown on demand instead.
pub fn parse_taxonomy(body: &[u8]) -> serde_json::Result<Vec<CategoryNode>> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let categories = Vec::<CategoryNode>::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(categories)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ExportConfig {
        ExportConfig::new().with_catalog_url(format!("{}/menu.json", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu.json"))
            .and(header("origin", "https://www.wildberries.ru"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 306, "name": "Women", "childs": [
                    {"id": 8126, "name": "Dresses", "shard": "women_clothes1", "query": "cat=8126"}
                ]},
                {"id": 566, "name": "Men", "shard": "men_clothes", "query": "cat=566"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let categories = client.fetch_catalog().await.unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Women");
        assert_eq!(categories[0].children().len(), 1);
        assert!(categories[1].is_leaf());
    }

    #[tokio::test]
    async fn test_fetch_catalog_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let err = client.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, ExportError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_fetch_catalog_rejects_non_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
            .mount(&server)
            .await;

        let client = CatalogClient::new(&config_for(&server)).unwrap();
        let err = client.fetch_catalog().await.unwrap_err();
        assert!(err.to_string().contains("not a taxonomy document"));
    }

    /// `depth` nested categories ending in one leaf, built as text so the
    /// fixture itself never recurses
    fn nested_taxonomy(depth: u64) -> String {
        let mut body = String::from("[");
        for id in 1..depth {
            body.push_str(&format!(r#"{{"id":{},"name":"Level {}","childs":["#, id, id));
        }
        body.push_str(&format!(
            r#"{{"id":{},"name":"Level {}","shard":"deep","query":"cat={}"}}"#,
            depth, depth, depth
        ));
        for _ in 1..depth {
            body.push_str("]}");
        }
        body.push(']');
        body
    }

    #[test]
    fn test_parse_taxonomy_beyond_default_recursion_limit() {
        let categories = parse_taxonomy(nested_taxonomy(1000).as_bytes()).unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].node_count(), 1000);
        assert_eq!(categories[0].leaf_count(), 1);
    }

    #[test]
    fn test_parse_taxonomy_rejects_trailing_data() {
        assert!(parse_taxonomy(br#"[{"id": 1, "name": "A"}] ["#).is_err());
        assert!(parse_taxonomy(br#"[{"id": 1, "name": "A"}]"#).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_catalog_unreachable() {
        let config = ExportConfig::new()
            .with_catalog_url("http://127.0.0.1:9/menu.json")
            .with_request_timeout(2);
        let client = CatalogClient::new(&config).unwrap();

        let err = client.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, ExportError::Http(_)));
    }
}
