//! Metadata table to raw metadata entries.
//!
//! The metadata table has one row per value. Its columns are located by
//! header name (case-insensitive, with a few aliases); `keyword` and `value`
//! are required, `language`, `variable` and `cell` are optional. Rows that
//! share keyword, language, variable and cell are merged, in row order, into
//! one list-valued entry.

use std::collections::HashMap;
use std::path::Path;

use px_model::{DataTable, Keyword, PxError, RawMetadataEntry};

use crate::error::{IngestError, Result};

const KEYWORD_ALIASES: &[&str] = &["keyword", "key"];
const VALUE_ALIASES: &[&str] = &["value", "values"];
const LANGUAGE_ALIASES: &[&str] = &["language", "lang"];
const VARIABLE_ALIASES: &[&str] = &["variable", "var"];
const CELL_ALIASES: &[&str] = &["cell", "value_code", "valuecode"];

/// Column positions of a metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataColumns {
    pub keyword: usize,
    pub value: usize,
    pub language: Option<usize>,
    pub variable: Option<usize>,
    pub cell: Option<usize>,
}

impl MetadataColumns {
    /// Locate metadata columns by header name.
    pub fn detect(table: &DataTable, path: &Path) -> Result<Self> {
        let find = |aliases: &[&str]| aliases.iter().find_map(|alias| table.column_index(alias));
        let required = |aliases: &[&str], column: &'static str| {
            find(aliases).ok_or_else(|| IngestError::MissingColumn {
                column,
                path: path.to_path_buf(),
            })
        };
        Ok(Self {
            keyword: required(KEYWORD_ALIASES, "keyword")?,
            value: required(VALUE_ALIASES, "value")?,
            language: find(LANGUAGE_ALIASES),
            variable: find(VARIABLE_ALIASES),
            cell: find(CELL_ALIASES),
        })
    }
}

type EntryKey = (Keyword, Option<String>, Option<String>, Option<String>);

/// Convert a metadata table into raw entries, merging rows with equal keys.
pub fn metadata_entries(table: &DataTable, path: &Path) -> Result<Vec<RawMetadataEntry>> {
    let columns = MetadataColumns::detect(table, path)?;
    let optional = |row: usize, column: Option<usize>| {
        column
            .map(|column| table.value(row, column).trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let mut entries: Vec<RawMetadataEntry> = Vec::new();
    let mut positions: HashMap<EntryKey, usize> = HashMap::new();
    let mut skipped = 0usize;

    for row in 0..table.row_count() {
        let name = table.value(row, columns.keyword).trim();
        let value = table.value(row, columns.value).trim();
        let language = optional(row, columns.language);
        let variable = optional(row, columns.variable);
        let cell = optional(row, columns.cell);

        if name.is_empty() {
            if value.is_empty() && language.is_none() && variable.is_none() && cell.is_none() {
                skipped += 1;
                continue;
            }
            return Err(invalid_row(
                path,
                row,
                PxError::input_shape("row has values but no keyword"),
            ));
        }
        let keyword = Keyword::lookup(name).ok_or_else(|| {
            invalid_row(
                path,
                row,
                PxError::UnknownKeyword {
                    keyword: name.to_string(),
                },
            )
        })?;

        let key = (keyword, language, variable, cell);
        match positions.get(&key) {
            Some(&index) => entries[index].value.push(value.to_string()),
            None => {
                let (keyword, language, variable, cell) = key.clone();
                positions.insert(key, entries.len());
                entries.push(RawMetadataEntry {
                    keyword,
                    language,
                    variable,
                    cell,
                    value: vec![value.to_string()],
                });
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        rows = table.row_count(),
        entries = entries.len(),
        blank = skipped,
        "Read metadata rows"
    );
    Ok(entries)
}

/// Spreadsheet row number: header is row 1, first data row is row 2.
fn invalid_row(path: &Path, row: usize, source: PxError) -> IngestError {
    IngestError::InvalidRow {
        path: path.to_path_buf(),
        row: row + 2,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::with_rows(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| (*v).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_detect_columns_with_aliases() {
        let table = table(&["Lang", "KEY", "Variable", "Values"], &[]);
        let columns = MetadataColumns::detect(&table, Path::new("m.csv")).unwrap();
        assert_eq!(columns.keyword, 1);
        assert_eq!(columns.value, 3);
        assert_eq!(columns.language, Some(0));
        assert_eq!(columns.variable, Some(2));
        assert_eq!(columns.cell, None);
    }

    #[test]
    fn test_missing_value_column() {
        let table = table(&["keyword", "language"], &[]);
        let err = MetadataColumns::detect(&table, Path::new("m.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { column: "value", .. }));
    }

    #[test]
    fn test_rows_merge_in_order() {
        let table = table(
            &["keyword", "language", "variable", "value"],
            &[
                &["STUB", "", "", "region"],
                &["VALUES", "sv", "region", "Norr"],
                &["", "", "", ""],
                &["stub", "", "", "kön"],
                &["VALUES", "sv", "region", "Syd"],
            ],
        );
        let entries = metadata_entries(&table, Path::new("m.csv")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].keyword, Keyword::Stub);
        assert_eq!(entries[0].value, vec!["region", "kön"]);
        assert_eq!(entries[1].language.as_deref(), Some("sv"));
        assert_eq!(entries[1].variable.as_deref(), Some("region"));
        assert_eq!(entries[1].value, vec!["Norr", "Syd"]);
    }

    #[test]
    fn test_unknown_keyword_names_row() {
        let table = table(&["keyword", "value"], &[&["TITLE", "x"], &["TITEL", "y"]]);
        let err = metadata_entries(&table, Path::new("m.csv")).unwrap_err();
        match err {
            IngestError::InvalidRow { row, source, .. } => {
                assert_eq!(row, 3);
                assert_eq!(
                    source,
                    PxError::UnknownKeyword {
                        keyword: "TITEL".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_without_keyword_is_rejected() {
        let table = table(&["keyword", "value"], &[&["", "orphan"]]);
        let err = metadata_entries(&table, Path::new("m.csv")).unwrap_err();
        assert!(matches!(
            err.model_error(),
            Some(PxError::InputShape { .. })
        ));
    }
}
