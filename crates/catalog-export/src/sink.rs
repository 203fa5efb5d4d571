//! Per-sheet row collection
//!
//! One [`RowSink`] exists per top-level category. Traversal tasks and leaf
//! fetches running on different worker threads append to the same sink, so
//! the cursor update is guarded by a mutex. Sinks of different categories
//! share nothing.

use catalog_common::types::{CategoryRow, SHEET_HEADER};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct SheetState {
    rows: Vec<CategoryRow>,
    /// Sheet row the next append lands on; row 0 holds the header
    next_row: usize,
}

/// Append-only collector for one sheet
#[derive(Debug)]
pub struct RowSink {
    name: String,
    state: Mutex<SheetState>,
}

impl RowSink {
    /// Create a sheet; its header occupies row 0 from the start
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(SheetState {
                rows: Vec::new(),
                next_row: 1,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> [&'static str; 4] {
        SHEET_HEADER
    }

    /// Write `row` at the cursor and advance it, returning the sheet row used
    pub fn append(&self, row: CategoryRow) -> usize {
        let mut state = self.lock();
        let at = state.next_row;
        state.rows.push(row);
        state.next_row += 1;
        at
    }

    /// Data rows written so far (header excluded)
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the data rows in sheet order
    pub fn rows(&self) -> Vec<CategoryRow> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SheetState> {
        // Appends cannot leave the state half-written, so a poisoned lock is
        // still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
