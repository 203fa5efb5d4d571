//! Workbook output
//!
//! A workbook is the set of sheets produced by one run. On close every sheet
//! is written to `<output_dir>/<sheet name>.csv`: header first, then the data
//! rows in the order they were appended.

use crate::sink::RowSink;
use catalog_common::{ExportError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Sheets of one export run
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Arc<RowSink>>,
}

/// A sheet written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSheet {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet; sheets are written in the order they were added
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Arc<RowSink> {
        let sink = Arc::new(RowSink::new(name));
        self.sheets.push(Arc::clone(&sink));
        sink
    }

    /// Total data rows across all sheets
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.len()).sum()
    }

    /// Write every sheet into `dir`, creating it if needed
    pub fn close(self, dir: &Path) -> Result<Vec<WrittenSheet>> {
        std::fs::create_dir_all(dir).map_err(|e| {
            ExportError::output(format!(
                "cannot create output directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let mut used = HashSet::new();
        let mut written = Vec::with_capacity(self.sheets.len());

        for sheet in &self.sheets {
            let file_name = unique_file_name(sheet.name(), &mut used);
            let path = dir.join(format!("{}.csv", file_name));
            let rows = write_sheet(sheet, &path)?;

            debug!(sheet = %sheet.name(), path = %path.display(), rows, "Sheet written");
            written.push(WrittenSheet {
                name: sheet.name().to_string(),
                path,
                rows,
            });
        }

        info!(sheets = written.len(), dir = %dir.display(), "Workbook closed");
        Ok(written)
    }
}

fn write_sheet(sheet: &RowSink, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(sheet.header())?;

    let rows = sheet.rows();
    for row in &rows {
        writer.write_record(row.to_record())?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// Turn a category name into a file name that is safe on common filesystems
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;
    // Compare case-insensitively for case-insensitive filesystems
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{} ({})", base, n);
        n += 1;
    }
    candidate
}
