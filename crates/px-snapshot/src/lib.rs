//! Binary snapshots of a normalized PX catalog and its completed data table.
//!
//! A snapshot freezes the result of normalization so a table can be
//! re-rendered later without the original spreadsheet. Converting a loaded
//! snapshot reproduces the original file byte for byte.
//!
//! # File Format
//!
//! ```text
//! +------------------+
//! | Magic: "PXS\x01" | 4 bytes - file identification
//! +------------------+
//! | Version: 1       | 4 bytes - u32 little-endian schema version
//! +------------------+
//! | rkyv Payload     | Variable
//! +------------------+
//! ```

mod error;
mod io;
mod types;

pub use error::{Result, SnapshotError};
pub use io::{
    compute_files_hash, load_snapshot, parse_snapshot_bytes, save_snapshot, serialize_snapshot,
};
pub use types::{CURRENT_SCHEMA_VERSION, EntrySnapshot, MAGIC_BYTES, SnapshotFile, TableSnapshot};
