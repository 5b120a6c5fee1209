//! CSV file reading.
//!
//! Files are decoded to text first: a byte-order mark selects the encoding,
//! otherwise UTF-8 is assumed and windows-1252 is the fallback for files that
//! are not valid UTF-8.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use px_model::DataTable;

use crate::error::{IngestError, Result};

/// Read a CSV file with a header row into a [`DataTable`].
///
/// Header names and cells are trimmed; rows may be shorter or longer than
/// the header.
pub fn read_csv_table(path: &Path, table: &'static str) -> Result<DataTable> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let text = decode_text(&bytes, path);
    parse_csv(&text, path, table)
}

/// Decode file bytes, honouring a byte-order mark.
pub fn decode_text(bytes: &[u8], path: &Path) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text.into_owned(),
        None => {
            tracing::warn!(
                path = %path.display(),
                "File is not valid UTF-8, decoding as windows-1252"
            );
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

fn parse_csv(text: &str, path: &Path, table: &'static str) -> Result<DataTable> {
    let parse_error = |e: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
            table,
        });
    }

    let mut data = DataTable::new(headers);
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        data.push_row(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    tracing::debug!(
        path = %path.display(),
        table,
        columns = data.headers.len(),
        rows = data.row_count(),
        "Read CSV table"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_table() {
        let file = create_temp_csv(b"Region, Year ,Population\n01,2019,100\n02,2019\n");
        let table = read_csv_table(file.path(), "data").unwrap();
        assert_eq!(table.headers, vec!["Region", "Year", "Population"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, 2), "100");
        assert_eq!(table.value(1, 2), "");
    }

    #[test]
    fn test_quoted_fields() {
        let file = create_temp_csv(b"keyword,value\nTITLE,\"Population, by region\"\n");
        let table = read_csv_table(file.path(), "metadata").unwrap();
        assert_eq!(table.value(0, 1), "Population, by region");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let file = create_temp_csv("\u{feff}år,value\n2019,1\n".as_bytes());
        let table = read_csv_table(file.path(), "data").unwrap();
        assert_eq!(table.headers[0], "år");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "år" in windows-1252
        let file = create_temp_csv(b"\xe5r,value\n2019,1\n");
        let table = read_csv_table(file.path(), "data").unwrap();
        assert_eq!(table.headers[0], "år");
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv(b"");
        let err = read_csv_table(file.path(), "data").unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable { table: "data", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv_table(Path::new("/nonexistent/data.csv"), "data").unwrap_err();
        assert!(matches!(err, IngestError::NotFound { .. }));
    }
}
