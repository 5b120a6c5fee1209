//! Input readers for PX table conversion.
//!
//! Produces the two canonical input shapes: raw metadata entries (one per
//! keyword, language, variable and cell) and a flat data table.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use px_ingest::{detect_input, load_input};
//!
//! let source = detect_input(Path::new("tables/population"))?;
//! let input = load_input(&source)?;
//! println!("{} metadata entries", input.metadata.len());
//! ```

mod csv_table;
mod error;
mod input;
mod metadata;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Readers ===
pub use csv_table::{decode_text, read_csv_table};
pub use metadata::{MetadataColumns, metadata_entries};
pub use workbook::{DATA_SHEET, METADATA_SHEET, WORKBOOK_EXTENSIONS, cell_text, read_workbook};

// === Input Dispatch ===
pub use input::{
    DATA_FILE, InputKind, InputSource, LoadedInput, METADATA_FILE, SNAPSHOT_EXTENSION,
    detect_input, load_input,
};
