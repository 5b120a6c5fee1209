//! Error types for input ingestion.

use std::path::PathBuf;

use px_model::PxError;
use thiserror::Error;

/// Errors that can occur while reading input tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file or directory does not exist.
    #[error("input not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Failed to parse a CSV file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to open or read a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Workbook lacks a required sheet.
    #[error("workbook {path} has no '{sheet}' sheet")]
    MissingSheet { path: PathBuf, sheet: &'static str },

    /// A table has no header row.
    #[error("table '{table}' in {path} is empty")]
    EmptyTable { path: PathBuf, table: &'static str },

    // === Metadata Errors ===
    /// Required column not found in the metadata table.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    /// A metadata row cannot be turned into an entry.
    #[error("{path}, metadata row {row}: {source}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: PxError,
    },

    /// Input does not match any supported shape.
    #[error(transparent)]
    Shape(#[from] PxError),
}

impl IngestError {
    /// The underlying model error, if this error carries one.
    pub fn model_error(&self) -> Option<&PxError> {
        match self {
            Self::InvalidRow { source, .. } => Some(source),
            Self::Shape(source) => Some(source),
            _ => None,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
