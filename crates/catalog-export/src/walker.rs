//! Concurrent taxonomy traversal
//!
//! [`TreeWalker::visit`] writes the row of a node and then either expands it
//! as a leaf or spawns one task per child and joins them all. A visit only
//! completes after every task below it has completed. Recursion goes through
//! spawned tasks, so deep taxonomies do not grow the call stack.

use crate::fetcher::{LeafFetcher, LeafOutcome};
use crate::models::CategoryNode;
use crate::sink::RowSink;
use catalog_common::types::{CategoryRow, NO_PARENT};
use futures::future::{BoxFuture, FutureExt};
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::error;

/// Counts gathered while walking a subtree
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    /// Taxonomy nodes visited (one row each)
    pub nodes: usize,
    /// Leaves handed to the fetcher
    pub leaves: usize,
    /// Leaves whose fetch failed
    pub failed_leaves: usize,
    /// Subcategory item rows written
    pub item_rows: usize,
    /// Child tasks that panicked; their subtrees are incomplete
    pub panicked_tasks: usize,
}

impl AddAssign for WalkStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.failed_leaves += other.failed_leaves;
        self.item_rows += other.item_rows;
        self.panicked_tasks += other.panicked_tasks;
    }
}

impl WalkStats {
    /// Rows written: one per node plus the extracted items
    pub fn rows(&self) -> usize {
        self.nodes + self.item_rows
    }
}

/// Walks a taxonomy into a sink
pub struct TreeWalker {
    fetcher: Arc<LeafFetcher>,
}

impl TreeWalker {
    pub fn new(fetcher: Arc<LeafFetcher>) -> Arc<Self> {
        Arc::new(Self { fetcher })
    }

    /// Walk the subtree rooted at `node`, which sits at `depth`
    pub fn visit(
        self: &Arc<Self>,
        node: CategoryNode,
        sink: Arc<RowSink>,
        depth: u32,
    ) -> BoxFuture<'static, WalkStats> {
        Arc::clone(self).descend(node, sink, depth, NO_PARENT)
    }

    fn descend(
        self: Arc<Self>,
        node: CategoryNode,
        sink: Arc<RowSink>,
        depth: u32,
        structural_parent: u64,
    ) -> BoxFuture<'static, WalkStats> {
        async move {
            sink.append(CategoryRow::new(
                node.id,
                node.name.clone(),
                depth,
                node.parent.unwrap_or(structural_parent),
            ));
            let mut stats = WalkStats {
                nodes: 1,
                ..WalkStats::default()
            };

            if node.is_leaf() {
                stats.leaves = 1;
                match self.fetcher.fetch(&node, &sink, node.id).await {
                    LeafOutcome::Extracted(items) => stats.item_rows = items,
                    LeafOutcome::Failed => stats.failed_leaves = 1,
                }
                return stats;
            }

            let parent_id = node.id;
            let name = node.name;
            let mut children = JoinSet::new();
            for child in node.children.unwrap_or_default() {
                children.spawn(Arc::clone(&self).descend(
                    child,
                    Arc::clone(&sink),
                    depth + 1,
                    parent_id,
                ));
            }

            while let Some(joined) = children.join_next().await {
                match joined {
                    Ok(child_stats) => stats += child_stats,
                    Err(err) => {
                        error!(category = %name, error = %err, "Traversal task failed");
                        stats.panicked_tasks += 1;
                    }
                }
            }

            stats
        }
        .boxed()
    }
}
