//! Command pipeline against real files on disk.

use std::fs;
use std::path::Path;

use px_cli::pipeline::{
    NormalizedFormat, default_output_path, load_and_convert, write_normalized, write_px,
};
use px_ingest::InputKind;
use px_model::{ConvertOptions, LineEnding};
use tempfile::TempDir;

const METADATA: &str = "\
keyword,language,variable,value
LANGUAGES,,,en
LANGUAGES,,,sv
CODEPAGE,,,utf-8
MATRIX,,,POP01
TITLE,en,,Population by region
TITLE,sv,,Folkmangd efter region
STUB,en,,region
STUB,sv,,region
HEADING,en,,year
HEADING,sv,,ar
CODES,en,region,N
CODES,en,region,S
VALUES,en,region,North
VALUES,en,region,South
VALUES,sv,region,Norr
VALUES,sv,region,Syd
VARIABLE-TYPE,en,year,time
";

const DATA: &str = "\
region,year,Population
N,2020,10
South,2021,12
N,2021,11
";

fn csv_pair() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("metadata.csv"), METADATA).unwrap();
    fs::write(dir.path().join("data.csv"), DATA).unwrap();
    dir
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

// ============================================================================
// Convert
// ============================================================================

#[test]
fn converts_csv_pair_to_px_file() {
    let dir = csv_pair();
    let options = ConvertOptions::default();
    let loaded = load_and_convert(dir.path(), &options).unwrap();
    assert_eq!(loaded.kind, InputKind::CsvPair);
    assert_eq!(loaded.source_sha256.as_ref().map(String::len), Some(64));

    let summary = loaded.conversion.summary();
    assert_eq!(summary.main_language, "en");
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 2);
    assert_eq!(summary.missing, 1);

    let output = dir.path().join("population.px");
    let report = write_px(&loaded, &output, &options).unwrap();
    let bytes = fs::read(&output).unwrap();
    assert_eq!(report.bytes, bytes.len());
    assert!(bytes.starts_with(b"CODEPAGE="));
    assert!(contains(&bytes, "DATA=\r\n"));
    assert!(contains(&bytes, "TITLE[sv]=\"Folkmangd efter region\";\r\n"));
    assert!(contains(&bytes, "LANGUAGE=\"en\";"));
    assert!(bytes.ends_with(b";\r\n"));
}

#[test]
fn line_ending_option_reaches_the_file() {
    let dir = csv_pair();
    let options = ConvertOptions::default().with_line_ending(LineEnding::Lf);
    let loaded = load_and_convert(dir.path(), &options).unwrap();
    let output = dir.path().join("lf.px");
    write_px(&loaded, &output, &options).unwrap();
    let bytes = fs::read(&output).unwrap();
    assert!(!contains(&bytes, "\r\n"));
    assert!(contains(&bytes, "DATA=\n"));
}

#[test]
fn unresolvable_code_reports_context() {
    let dir = csv_pair();
    fs::write(
        dir.path().join("data.csv"),
        "region,year,Population\nW,2020,1\n",
    )
    .unwrap();
    let err = load_and_convert(dir.path(), &ConvertOptions::default()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("convert"), "{message}");
    assert!(message.contains("W"), "{message}");
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nothing");
    let err = load_and_convert(&missing, &ConvertOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("nothing"));
}

#[test]
fn default_output_sits_next_to_input() {
    let dir = csv_pair();
    let output = default_output_path(dir.path());
    assert_eq!(output.parent(), dir.path().parent());
    assert_eq!(output.extension().and_then(|ext| ext.to_str()), Some("px"));
}

// ============================================================================
// Normalize
// ============================================================================

#[test]
fn snapshot_reconverts_to_identical_file() {
    let dir = csv_pair();
    let options = ConvertOptions::default();
    let loaded = load_and_convert(dir.path(), &options).unwrap();
    let direct = dir.path().join("direct.px");
    write_px(&loaded, &direct, &options).unwrap();

    let snapshot = dir.path().join("table.pxsnap");
    let format = write_normalized(&loaded, &snapshot).unwrap();
    assert_eq!(format, NormalizedFormat::Snapshot);

    let reloaded = load_and_convert(&snapshot, &options).unwrap();
    assert_eq!(reloaded.kind, InputKind::Snapshot);
    assert_eq!(reloaded.source_sha256, loaded.source_sha256);
    let again = dir.path().join("again.px");
    write_px(&reloaded, &again, &options).unwrap();

    assert_eq!(fs::read(&direct).unwrap(), fs::read(&again).unwrap());
}

#[test]
fn json_dump_lists_entries_and_completed_table() {
    let dir = csv_pair();
    let loaded = load_and_convert(dir.path(), &ConvertOptions::default()).unwrap();
    let output = dir.path().join("table.json");
    let format = write_normalized(&loaded, &output).unwrap();
    assert_eq!(format, NormalizedFormat::Json);

    let text = fs::read_to_string(&output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["main_language"], "en");
    assert_eq!(value["language_order"], serde_json::json!(["en", "sv"]));
    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), loaded.conversion.catalog.len());
    assert_eq!(entries[0]["keyword"], "CODEPAGE");
    let rows = value["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(!Path::new(&dir.path().join("table.json.tmp")).exists());
}
