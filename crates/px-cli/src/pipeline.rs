//! Command pipeline: load an input, convert it, write the results.
//!
//! # Stages
//!
//! 1. **load** - classify the input and read tables or a snapshot
//! 2. **convert** - normalize metadata and build the cube
//! 3. **write** - encode the PX file, or save a snapshot / JSON dump

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use px_core::{Conversion, convert, convert_catalog};
use px_ingest::{InputKind, detect_input, load_input};
use px_model::{ConvertOptions, DataTable, MetadataEntry};
use px_output::{WriteReport, write_atomic, write_px_file};
use px_snapshot::{SnapshotFile, compute_files_hash, load_snapshot, save_snapshot};
use serde::Serialize;
use tracing::{info, info_span};

/// A converted input together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConversion {
    pub conversion: Conversion,
    pub kind: InputKind,
    /// Input description carried into snapshots.
    pub source: String,
    /// Hex SHA-256 of the input bytes.
    pub source_sha256: Option<String>,
}

/// Load any supported input and run the conversion.
pub fn load_and_convert(input: &Path, options: &ConvertOptions) -> Result<LoadedConversion> {
    let start = Instant::now();
    let source = detect_input(input).with_context(|| format!("load {}", input.display()))?;

    let loaded = match source.kind {
        InputKind::Snapshot => {
            let snapshot = info_span!("load")
                .in_scope(|| load_snapshot(&source.path))
                .with_context(|| format!("load snapshot {}", source.path.display()))?;
            let catalog = snapshot.catalog().context("restore snapshot catalog")?;
            let conversion =
                convert_catalog(catalog, &snapshot.data_table(), options).context("convert")?;
            LoadedConversion {
                conversion,
                kind: source.kind,
                source: snapshot.source,
                source_sha256: snapshot.source_sha256,
            }
        }
        InputKind::CsvPair | InputKind::Workbook => {
            let input = info_span!("load")
                .in_scope(|| load_input(&source))
                .with_context(|| format!("load {}", source.describe()))?;
            let sha256 = compute_files_hash(&source.files()).context("hash input")?;
            let conversion = convert(input.metadata, &input.data, options).context("convert")?;
            LoadedConversion {
                conversion,
                kind: source.kind,
                source: source.describe(),
                source_sha256: Some(sha256),
            }
        }
    };

    info!(
        kind = %loaded.kind,
        duration_ms = start.elapsed().as_millis(),
        "Input converted"
    );
    Ok(loaded)
}

/// `<input>.px` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let trimmed: PathBuf = input.components().collect();
    trimmed.with_extension("px")
}

/// Encode and write the PX file.
pub fn write_px(
    loaded: &LoadedConversion,
    output: &Path,
    options: &ConvertOptions,
) -> Result<WriteReport> {
    let conversion = &loaded.conversion;
    info_span!("write")
        .in_scope(|| write_px_file(output, &conversion.catalog, &conversion.cube, options))
        .with_context(|| format!("write {}", output.display()))
}

/// JSON form of a normalized table.
#[derive(Debug, Serialize)]
pub struct NormalizedDump<'a> {
    pub source: &'a str,
    pub source_sha256: Option<&'a str>,
    pub main_language: &'a str,
    pub language_order: &'a [String],
    pub entries: &'a [MetadataEntry],
    pub data: DataTable,
}

/// What `write_normalized` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedFormat {
    Snapshot,
    Json,
}

/// Save the normalized catalog and completed table, as JSON when the output
/// ends in `.json`, otherwise as a binary snapshot.
pub fn write_normalized(loaded: &LoadedConversion, output: &Path) -> Result<NormalizedFormat> {
    let conversion = &loaded.conversion;
    let data = conversion.cube.to_data_table();
    let is_json = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let _span = info_span!("write", output = %output.display()).entered();
    if is_json {
        let dump = NormalizedDump {
            source: &loaded.source,
            source_sha256: loaded.source_sha256.as_deref(),
            main_language: &conversion.catalog.main_language,
            language_order: &conversion.catalog.language_order,
            entries: conversion.catalog.entries(),
            data,
        };
        let mut text = serde_json::to_string_pretty(&dump).context("serialize JSON")?;
        text.push('\n');
        write_atomic(output, text.as_bytes())
            .with_context(|| format!("write {}", output.display()))?;
        info!(path = %output.display(), "Wrote normalized JSON");
        Ok(NormalizedFormat::Json)
    } else {
        let snapshot = SnapshotFile::new(
            &conversion.catalog,
            &data,
            loaded.source.clone(),
            loaded.source_sha256.clone(),
        );
        save_snapshot(&snapshot, output)
            .with_context(|| format!("write snapshot {}", output.display()))?;
        Ok(NormalizedFormat::Snapshot)
    }
}
