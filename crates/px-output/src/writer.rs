//! Encoded, atomic PX file writing.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use px_model::{Catalog, ConvertOptions, DataCube};

use crate::error::{OutputError, Result};
use crate::render::render_to_string;

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub bytes: usize,
    /// Canonical name of the encoding used.
    pub encoding: &'static str,
}

/// Resolve the file encoding from CODEPAGE, else the configured default.
/// Encodings that `encoding_rs` only decodes are rejected.
pub fn resolve_encoding(
    catalog: &Catalog,
    options: &ConvertOptions,
) -> Result<&'static Encoding> {
    let label = catalog
        .codepage()
        .unwrap_or(options.default_codepage.as_str());
    let encoding =
        Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| OutputError::UnknownCodepage {
            label: label.to_string(),
        })?;
    if encoding.output_encoding() != encoding {
        return Err(OutputError::UnsupportedCodepage {
            label: label.to_string(),
            encoding: encoding.name(),
        });
    }
    Ok(encoding)
}

/// Encode text, failing on the first character the encoding cannot hold.
pub fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        let mut buffer = [0u8; 4];
        let character = text
            .chars()
            .find(|c| encoding.encode(c.encode_utf8(&mut buffer)).2)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(OutputError::Unencodable {
            encoding: used.name(),
            character,
        });
    }
    Ok(bytes.into_owned())
}

/// Render, encode and atomically write a PX file.
pub fn write_px_file(
    path: &Path,
    catalog: &Catalog,
    cube: &DataCube,
    options: &ConvertOptions,
) -> Result<WriteReport> {
    let encoding = resolve_encoding(catalog, options)?;
    let text = render_to_string(catalog, cube, options);
    let bytes = encode(&text, encoding)?;
    write_atomic(path, &bytes)?;

    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        encoding = encoding.name(),
        "Wrote PX file"
    );
    Ok(WriteReport {
        path: path.to_path_buf(),
        bytes: bytes.len(),
        encoding: encoding.name(),
    })
}

/// Write to a sibling temp file, sync, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path).map_err(|e| OutputError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| OutputError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| OutputError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| OutputError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}
