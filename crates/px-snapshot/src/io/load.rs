//! Snapshot loading.

use std::fs;
use std::path::Path;

use rkyv::util::AlignedVec;

use crate::error::{Result, SnapshotError};
use crate::types::{CURRENT_SCHEMA_VERSION, MAGIC_BYTES, SnapshotFile};

const HEADER_LEN: usize = 8;

/// Load a snapshot from a .pxsnap file.
pub fn load_snapshot(path: &Path) -> Result<SnapshotFile> {
    let bytes = fs::read(path).map_err(|e| SnapshotError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_snapshot_bytes(&bytes, path)
}

/// Validate the header and deserialize the payload.
pub fn parse_snapshot_bytes(bytes: &[u8], path: &Path) -> Result<SnapshotFile> {
    let invalid = |reason: &str| SnapshotError::InvalidFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    if bytes.len() < HEADER_LEN + 4 {
        return Err(invalid("file too small"));
    }
    if bytes[0..4] != MAGIC_BYTES {
        return Err(invalid("not a snapshot file (invalid magic bytes)"));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version > CURRENT_SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: version,
            max_supported: CURRENT_SCHEMA_VERSION,
            path: path.to_path_buf(),
        });
    }

    let mut payload = AlignedVec::<16>::with_capacity(bytes.len() - HEADER_LEN);
    payload.extend_from_slice(&bytes[HEADER_LEN..]);
    let snapshot = rkyv::from_bytes::<SnapshotFile, rkyv::rancor::Error>(&payload).map_err(|e| {
        SnapshotError::Deserialization {
            path: path.to_path_buf(),
            source: Box::new(std::io::Error::other(format!(
                "rkyv deserialization failed: {e}"
            ))),
        }
    })?;

    tracing::info!(
        path = %path.display(),
        source = %snapshot.source,
        entries = snapshot.entries.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}
