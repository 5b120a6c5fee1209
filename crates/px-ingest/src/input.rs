//! Input-shape dispatch.
//!
//! | Input                                   | Kind          |
//! |-----------------------------------------|---------------|
//! | directory with metadata.csv + data.csv  | `CsvPair`     |
//! | `.xlsx` / `.xlsm` / `.xls` / `.ods`     | `Workbook`    |
//! | `.pxsnap`                               | `Snapshot`    |
//!
//! Snapshots are classified here but read by the snapshot crate.

use std::fmt;
use std::path::{Path, PathBuf};

use px_model::{DataTable, PxError, RawMetadataEntry};

use crate::csv_table::read_csv_table;
use crate::error::{IngestError, Result};
use crate::metadata::metadata_entries;
use crate::workbook::{WORKBOOK_EXTENSIONS, read_workbook};

pub const METADATA_FILE: &str = "metadata.csv";
pub const DATA_FILE: &str = "data.csv";
pub const SNAPSHOT_EXTENSION: &str = "pxsnap";

/// Recognised input shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    CsvPair,
    Workbook,
    Snapshot,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CsvPair => "csv pair",
            Self::Workbook => "workbook",
            Self::Snapshot => "snapshot",
        })
    }
}

/// A classified input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSource {
    pub path: PathBuf,
    pub kind: InputKind,
}

impl InputSource {
    /// Files whose bytes make up this input, in a fixed order.
    pub fn files(&self) -> Vec<PathBuf> {
        match self.kind {
            InputKind::CsvPair => vec![self.path.join(METADATA_FILE), self.path.join(DATA_FILE)],
            InputKind::Workbook | InputKind::Snapshot => vec![self.path.clone()],
        }
    }

    /// Short description used in logs and snapshots.
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind, self.path.display())
    }
}

/// Metadata rows and data table read from one input.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub source: InputSource,
    pub metadata: Vec<RawMetadataEntry>,
    pub data: DataTable,
}

/// Classify an input path.
pub fn detect_input(path: &Path) -> Result<InputSource> {
    if !path.exists() {
        return Err(IngestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let source = |kind| InputSource {
        path: path.to_path_buf(),
        kind,
    };

    if path.is_dir() {
        let missing: Vec<&str> = [METADATA_FILE, DATA_FILE]
            .into_iter()
            .filter(|file| !path.join(file).is_file())
            .collect();
        if missing.is_empty() {
            return Ok(source(InputKind::CsvPair));
        }
        return Err(PxError::input_shape(format!(
            "directory {} lacks {}",
            path.display(),
            missing.join(" and ")
        ))
        .into());
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        Ok(source(InputKind::Workbook))
    } else if extension == SNAPSHOT_EXTENSION {
        Ok(source(InputKind::Snapshot))
    } else {
        Err(PxError::input_shape(format!(
            "{} is neither a workbook, a snapshot nor a directory with {METADATA_FILE} and {DATA_FILE}",
            path.display()
        ))
        .into())
    }
}

/// Read metadata rows and the data table of a CSV pair or workbook input.
pub fn load_input(source: &InputSource) -> Result<LoadedInput> {
    let (metadata_path, metadata_table, data) = match source.kind {
        InputKind::CsvPair => {
            let metadata_path = source.path.join(METADATA_FILE);
            let metadata = read_csv_table(&metadata_path, "metadata")?;
            let data = read_csv_table(&source.path.join(DATA_FILE), "data")?;
            (metadata_path, metadata, data)
        }
        InputKind::Workbook => {
            let (metadata, data) = read_workbook(&source.path)?;
            (source.path.clone(), metadata, data)
        }
        InputKind::Snapshot => {
            return Err(PxError::input_shape(format!(
                "{} is a snapshot, not a table input",
                source.path.display()
            ))
            .into());
        }
    };
    let metadata = metadata_entries(&metadata_table, &metadata_path)?;
    tracing::info!(
        input = %source.describe(),
        entries = metadata.len(),
        rows = data.row_count(),
        "Loaded input"
    );
    Ok(LoadedInput {
        source: source.clone(),
        metadata,
        data,
    })
}
