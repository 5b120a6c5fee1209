//! Snapshot payload types.
//!
//! Mirrors of the catalog and data table in rkyv-serializable form. Keywords
//! are stored by name so the keyword enum can grow without breaking old
//! files.

use chrono::{DateTime, Utc};
use px_model::{Catalog, DataTable, Keyword, MetadataEntry};
use rkyv::{Archive, Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Current schema version.
///
/// The loader rejects files with version > CURRENT_SCHEMA_VERSION.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Magic bytes at the start of .pxsnap files: "PXS" + format byte.
pub const MAGIC_BYTES: [u8; 4] = [b'P', b'X', b'S', 0x01];

/// Root snapshot structure.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub struct SnapshotFile {
    pub schema_version: u32,

    /// RFC 3339 creation time.
    pub created_at: String,

    /// Where the snapshot was taken from (input kind and path).
    pub source: String,

    /// Hex SHA-256 of the source bytes, when known.
    pub source_sha256: Option<String>,

    pub main_language: String,
    pub language_order: Vec<String>,
    pub entries: Vec<EntrySnapshot>,

    /// Completed long data table.
    pub data: TableSnapshot,
}

/// One normalized metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub struct EntrySnapshot {
    pub keyword: String,
    pub language: String,
    pub variable: Option<String>,
    pub cell: Option<String>,
    pub value: Vec<String>,
}

/// Data table rows as text.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq))]
pub struct TableSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SnapshotFile {
    /// Snapshot a catalog and data table, stamped with the current time.
    pub fn new(
        catalog: &Catalog,
        data: &DataTable,
        source: impl Into<String>,
        source_sha256: Option<String>,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: Utc::now().to_rfc3339(),
            source: source.into(),
            source_sha256,
            main_language: catalog.main_language.clone(),
            language_order: catalog.language_order.clone(),
            entries: catalog.entries().iter().map(EntrySnapshot::from).collect(),
            data: TableSnapshot::from(data),
        }
    }

    /// Parse the created_at timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Rebuild the catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        let entries = self
            .entries
            .iter()
            .map(|entry| entry.to_entry(&self.main_language))
            .collect::<Result<Vec<_>>>()?;
        Ok(Catalog::new(
            self.main_language.clone(),
            self.language_order.clone(),
            entries,
        ))
    }

    /// Rebuild the data table.
    pub fn data_table(&self) -> DataTable {
        DataTable::with_rows(self.data.headers.clone(), self.data.rows.clone())
    }
}

impl From<&MetadataEntry> for EntrySnapshot {
    fn from(entry: &MetadataEntry) -> Self {
        Self {
            keyword: entry.keyword.name().to_string(),
            language: entry.language.clone(),
            variable: entry.variable.clone(),
            cell: entry.cell.clone(),
            value: entry.value.clone(),
        }
    }
}

impl EntrySnapshot {
    fn to_entry(&self, main_language: &str) -> Result<MetadataEntry> {
        let keyword = Keyword::lookup(&self.keyword).ok_or_else(|| SnapshotError::UnknownKeyword {
            keyword: self.keyword.clone(),
        })?;
        Ok(MetadataEntry {
            keyword,
            language: self.language.clone(),
            variable: self.variable.clone(),
            cell: self.cell.clone(),
            value: self.value.clone(),
            is_main_language: self.language == main_language,
        })
    }
}

impl From<&DataTable> for TableSnapshot {
    fn from(table: &DataTable) -> Self {
        Self {
            headers: table.headers.clone(),
            rows: table.rows.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let entry = |keyword, language: &str, value: &str| MetadataEntry {
            keyword,
            language: language.to_string(),
            variable: None,
            cell: None,
            value: vec![value.to_string()],
            is_main_language: language == "sv",
        };
        Catalog::new(
            "sv",
            vec!["sv".to_string(), "en".to_string()],
            vec![
                entry(Keyword::Title, "sv", "Folkmängd"),
                entry(Keyword::Title, "en", "Population"),
            ],
        )
    }

    #[test]
    fn test_catalog_round_trip() {
        let snapshot = SnapshotFile::new(&catalog(), &DataTable::default(), "test", None);
        assert_eq!(snapshot.entries[0].keyword, "TITLE");
        assert_eq!(snapshot.catalog().unwrap(), catalog());
        assert!(snapshot.created_at().is_some());
    }

    #[test]
    fn test_unknown_keyword() {
        let mut snapshot = SnapshotFile::new(&catalog(), &DataTable::default(), "test", None);
        snapshot.entries[0].keyword = "NOT-A-KEYWORD".to_string();
        assert!(matches!(
            snapshot.catalog(),
            Err(SnapshotError::UnknownKeyword { .. })
        ));
    }
}
