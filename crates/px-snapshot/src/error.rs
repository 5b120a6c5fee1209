//! Snapshot error types.

use std::path::PathBuf;
use thiserror::Error;

/// Snapshot operation error.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File I/O error.
    #[error("failed to {operation} file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a snapshot file.
    #[error("invalid snapshot file {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// Written by a newer schema.
    #[error("snapshot version {found} is not supported (maximum: {max_supported}): {path}")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// A stored entry names a keyword this build does not know.
    #[error("snapshot contains unknown keyword '{keyword}'")]
    UnknownKeyword { keyword: String },

    /// Serialization error.
    #[error("failed to serialize snapshot")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("failed to deserialize snapshot {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Temp file could not be renamed over the target.
    #[error("failed to move {temp_path} to {target_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
