//! Common types used across catalog export

use serde::{Deserialize, Serialize};

/// Column names of every exported sheet, in output order.
pub const SHEET_HEADER: [&str; 4] = ["ID", "Name", "Depth", "Parent"];

/// Parent value written for rows that have no parent.
pub const NO_PARENT: u64 = 0;

/// One exported row: a taxonomy node or a subcategory item of a leaf.
///
/// Rows are immutable once created. Field order matches [`SHEET_HEADER`], so
/// a row serializes straight into a CSV record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: u64,
    pub name: String,
    pub depth: u32,
    pub parent: u64,
}

impl CategoryRow {
    pub fn new(id: u64, name: impl Into<String>, depth: u32, parent: u64) -> Self {
        Self {
            id,
            name: name.into(),
            depth,
            parent,
        }
    }

    /// Fields in column order, as strings
    pub fn to_record(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.depth.to_string(),
            self.parent.to_string(),
        ]
    }
}

impl std::fmt::Display for CategoryRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' (depth {}, parent {})",
            self.id, self.name, self.depth, self.parent
        )
    }
}
