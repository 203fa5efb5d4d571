//! Filters response validation
//!
//! Expected body:
//!
//! ```text
//! {"data": {"filters": [{"name": "...", "items": [{"id": 1, "name": "...", "depth": 3, "parent": 2}]}]}}
//! ```
//!
//! `data` and `data.filters` must be present (`filters` may be `null`).
//! Group `name` and `items` are optional. Items need an integer `id` and a
//! string `name`; `depth` and `parent` may be absent or `null`. Unknown fields
//! are ignored everywhere.

use crate::models::{FilterGroup, FilterItem, FilterSet};
use serde::Deserialize;
use thiserror::Error;

/// Why a filters response was rejected
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The body is not JSON at all
    #[error("response is not valid JSON: {0}")]
    Syntax(String),

    /// JSON whose shape does not match the filters document
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => SchemaError::Syntax(err.to_string()),
            Category::Data => SchemaError::Shape(err.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    data: Data,
}

#[derive(Deserialize)]
struct Data {
    // Required key, nullable value
    #[serde(deserialize_with = "Option::deserialize")]
    filters: Option<Vec<WireGroup>>,
}

#[derive(Deserialize)]
struct WireGroup {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    items: Option<Vec<WireItem>>,
}

#[derive(Deserialize)]
struct WireItem {
    id: u64,
    name: String,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    parent: Option<u64>,
}

/// Validate a raw filters response body
pub fn validate_filters(body: &[u8]) -> Result<FilterSet, SchemaError> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    let groups = envelope
        .data
        .filters
        .unwrap_or_default()
        .into_iter()
        .map(|group| FilterGroup {
            name: group.name,
            items: group
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|item| FilterItem {
                    id: item.id,
                    name: item.name,
                    depth: item.depth,
                    parent: item.parent,
                })
                .collect(),
        })
        .collect();

    Ok(FilterSet::new(groups))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_response() {
        let body = br#"{
            "data": {
                "filters": [
                    {"name": "Brand", "key": "fbrand", "items": [{"id": 5, "name": "Acme", "count": 10}]},
                    {"name": "Category", "key": "xsubject", "items": [
                        {"id": 11, "name": "Dresses", "depth": 4},
                        {"id": 12, "name": "Sundresses", "parent": 7}
                    ]}
                ],
                "total": 1234
            }
        }"#;

        let set = validate_filters(body).unwrap();
        assert_eq!(set.groups.len(), 2);

        let items: Vec<_> = set.items_in("Category").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].depth, Some(4));
        assert_eq!(items[1].depth, None);
        assert_eq!(items[1].parent, Some(7));
    }

    #[test]
    fn test_null_filters_is_empty() {
        let set = validate_filters(br#"{"data": {"filters": null}}"#).unwrap();
        assert!(set.groups.is_empty());
    }

    #[test]
    fn test_group_without_items() {
        let set = validate_filters(br#"{"data": {"filters": [{"name": "Category"}]}}"#).unwrap();
        assert_eq!(set.items_in("Category").count(), 0);
    }

    #[test]
    fn test_null_depth_treated_as_absent() {
        let body = br#"{"data": {"filters": [{"name": "Category", "items": [{"id": 1, "name": "A", "depth": null}]}]}}"#;
        let set = validate_filters(body).unwrap();
        assert_eq!(set.groups[0].items[0].depth, None);
    }

    #[test]
    fn test_missing_filters_key_rejected() {
        let err = validate_filters(br#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape(_)));
    }

    #[test]
    fn test_missing_data_rejected() {
        let err = validate_filters(br#"{"state": 0}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape(_)));

        let err = validate_filters(br#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Shape(_)));
    }

    #[test]
    fn test_item_without_id_rejected() {
        let body = br#"{"data": {"filters": [{"name": "Category", "items": [{"name": "A"}]}]}}"#;
        assert!(matches!(validate_filters(body), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_wrong_types_rejected() {
        let body = br#"{"data": {"filters": [{"name": "Category", "items": [{"id": "11", "name": "A"}]}]}}"#;
        assert!(matches!(validate_filters(body), Err(SchemaError::Shape(_))));

        let body = br#"{"data": {"filters": {"name": "Category"}}}"#;
        assert!(matches!(validate_filters(body), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_not_json() {
        let err = validate_filters(b"<html>captcha</html>").unwrap_err();
        assert!(matches!(err, SchemaError::Syntax(_)));

        let err = validate_filters(b"").unwrap_err();
        assert!(matches!(err, SchemaError::Syntax(_)));
    }
}
