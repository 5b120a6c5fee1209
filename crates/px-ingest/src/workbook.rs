//! Workbook reading via calamine.
//!
//! A workbook input carries two sheets, `metadata` and `data` (names matched
//! case-insensitively). The first row of each sheet is its header row.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use px_model::DataTable;

use crate::error::{IngestError, Result};

pub const METADATA_SHEET: &str = "metadata";
pub const DATA_SHEET: &str = "data";

/// File extensions opened as workbooks.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Read the metadata and data sheets of a workbook.
pub fn read_workbook(path: &Path) -> Result<(DataTable, DataTable)> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names();

    let mut read_sheet = |sheet: &'static str| -> Result<DataTable> {
        let name = sheet_names
            .iter()
            .find(|name| name.trim().eq_ignore_ascii_case(sheet))
            .ok_or_else(|| IngestError::MissingSheet {
                path: path.to_path_buf(),
                sheet,
            })?;
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| workbook_error(e.to_string()))?;
        range_to_table(&range, path, sheet)
    };
    let metadata = read_sheet(METADATA_SHEET)?;
    let data = read_sheet(DATA_SHEET)?;

    tracing::info!(
        path = %path.display(),
        metadata_rows = metadata.row_count(),
        data_rows = data.row_count(),
        "Read workbook"
    );
    Ok((metadata, data))
}

fn range_to_table(range: &Range<Data>, path: &Path, sheet: &'static str) -> Result<DataTable> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell_text(cell).trim().to_string()).collect())
        .unwrap_or_default();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
            table: sheet,
        });
    }

    let mut table = DataTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(|cell| cell_text(cell).trim().to_string()).collect());
    }
    Ok(table)
}

/// Text of one cell. Integral floats are written without a fraction.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => float_text(dt.as_f64()),
        Data::DateTimeIso(dt) => dt.clone(),
        Data::DurationIso(d) => d.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
