//! Catalog data models
//!
//! [`CategoryNode`] mirrors the root taxonomy document. [`FilterSet`] is the
//! validated form of one leaf's filters response, produced by
//! [`crate::schema::validate_filters`].

use serde::{Deserialize, Serialize};

/// A node of the root taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: u64,
    pub name: String,
    /// Nested categories; `childs` on the wire
    #[serde(rename = "childs", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CategoryNode>>,
    /// Filters API shard, only meaningful on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<String>,
    /// Encoded query fragment (e.g. `cat=8126`), only meaningful on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Storefront path of the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Upstream parent id, when the document carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

impl CategoryNode {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            children: None,
            shard: None,
            query: None,
            url: None,
            parent: None,
        }
    }

    /// A leaf pointing at `shard` / `query` in the filters API
    pub fn leaf(id: u64, name: impl Into<String>, shard: &str, query: &str) -> Self {
        Self {
            shard: Some(shard.to_string()),
            query: Some(query.to_string()),
            ..Self::new(id, name)
        }
    }

    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// A node is a leaf when it has no children; an empty `childs` list
    /// counts as none.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().map_or(true, Vec::is_empty)
    }

    pub fn children(&self) -> &[CategoryNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Nodes in the subtree rooted here, including this one
    pub fn node_count(&self) -> usize {
        self.subtree().count()
    }

    /// Leaves in the subtree rooted here
    pub fn leaf_count(&self) -> usize {
        self.subtree().filter(|node| node.is_leaf()).count()
    }

    /// Depth-first walk over the subtree without recursion
    fn subtree(&self) -> impl Iterator<Item = &CategoryNode> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            pending.extend(node.children());
            Some(node)
        })
    }

    /// Identifies the node in log lines
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) => format!("{} ({})", self.name, url),
            None => format!("{} (id {}, no URL)", self.name, self.id),
        }
    }
}

/// One subcategory entry of a filter group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    pub id: u64,
    pub name: String,
    pub depth: Option<u32>,
    pub parent: Option<u64>,
}

/// A named group of filter items
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterGroup {
    pub name: Option<String>,
    pub items: Vec<FilterItem>,
}

/// Validated filters response of one leaf
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub groups: Vec<FilterGroup>,
}

impl FilterSet {
    pub fn new(groups: Vec<FilterGroup>) -> Self {
        Self { groups }
    }

    /// Items of every group called `name`, in response order
    pub fn items_in<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FilterItem> + 'a {
        self.groups
            .iter()
            .filter(move |group| group.name.as_deref() == Some(name))
            .flat_map(|group| group.items.iter())
    }
}
