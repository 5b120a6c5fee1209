//! Flat data table as produced by the input collaborators.

use serde::{Deserialize, Serialize};

/// One row per observation, one column per variable, all values as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index by header name (case-insensitive, trimmed).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let target = name.trim();
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(target))
    }

    /// Cell text; short rows read as empty.
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}
