//! Source hashing.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::{Result, SnapshotError};

/// SHA-256 over the bytes of every file, in order, as lowercase hex.
pub fn compute_files_hash(paths: &[PathBuf]) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    for path in paths {
        let read_error = |e| SnapshotError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        };
        let file = File::open(path).map_err(read_error)?;
        let mut reader = BufReader::new(file);
        loop {
            let bytes_read = reader.read(&mut buffer).map_err(read_error)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
