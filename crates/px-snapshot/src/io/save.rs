//! Snapshot saving.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SnapshotError};
use crate::types::{CURRENT_SCHEMA_VERSION, MAGIC_BYTES, SnapshotFile};

/// Save a snapshot, writing a temp file and renaming it over `path`.
pub fn save_snapshot(snapshot: &SnapshotFile, path: &Path) -> Result<()> {
    let bytes = serialize_snapshot(snapshot)?;
    let temp_path = path.with_extension("pxsnap.tmp");

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SnapshotError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let io_error = |operation: &'static str| {
        let temp_path = temp_path.clone();
        move |source| SnapshotError::Io {
            operation,
            path: temp_path,
            source,
        }
    };
    let mut file = File::create(&temp_path).map_err(io_error("create"))?;
    file.write_all(&bytes).map_err(io_error("write"))?;
    file.sync_all().map_err(io_error("sync"))?;

    fs::rename(&temp_path, path).map_err(|e| SnapshotError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        entries = snapshot.entries.len(),
        rows = snapshot.data.rows.len(),
        "Saved snapshot"
    );
    Ok(())
}

/// Serialize a snapshot to bytes.
///
/// Format:
/// - 4 bytes: Magic ("PXS\x01")
/// - 4 bytes: Schema version (u32 little-endian)
/// - N bytes: rkyv payload
pub fn serialize_snapshot(snapshot: &SnapshotFile) -> Result<Vec<u8>> {
    let payload = rkyv::to_bytes::<rkyv::rancor::Error>(snapshot).map_err(|e| {
        SnapshotError::Serialization {
            source: Box::new(std::io::Error::other(format!(
                "rkyv serialization failed: {e}"
            ))),
        }
    })?;

    let mut output = Vec::with_capacity(8 + payload.len());
    output.extend_from_slice(&MAGIC_BYTES);
    output.extend_from_slice(&CURRENT_SCHEMA_VERSION.to_le_bytes());
    output.extend_from_slice(&payload);
    Ok(output)
}
