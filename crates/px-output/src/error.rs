//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while encoding or writing a PX file.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CODEPAGE (or the configured default) names no known encoding.
    #[error("unknown codepage '{label}'")]
    UnknownCodepage { label: String },

    /// The encoding is known but cannot be written (UTF-16, replacement).
    #[error("codepage '{label}' ({encoding}) cannot be used for output")]
    UnsupportedCodepage {
        label: String,
        encoding: &'static str,
    },

    /// The rendered text contains a character the encoding cannot represent.
    #[error("character '{character}' cannot be encoded as {encoding}")]
    Unencodable {
        encoding: &'static str,
        character: char,
    },

    /// The temp file could not be renamed over the target.
    #[error("failed to move {temp_path} to {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
