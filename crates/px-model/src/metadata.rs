//! Metadata entries and the catalog that holds them.
//!
//! A [`RawMetadataEntry`] is what an input collaborator produces: its
//! language may be unset. Normalization turns a set of raw entries into a
//! [`Catalog`] of [`MetadataEntry`] values whose language is always filled.

use serde::{Deserialize, Serialize};

use crate::keyword::Keyword;

/// One metadata fact before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadataEntry {
    pub keyword: Keyword,
    pub language: Option<String>,
    pub variable: Option<String>,
    pub cell: Option<String>,
    pub value: Vec<String>,
}

impl RawMetadataEntry {
    /// Table-level entry with no language.
    pub fn new(keyword: Keyword, value: Vec<String>) -> Self {
        Self {
            keyword,
            language: None,
            variable: None,
            cell: None,
            value,
        }
    }

    /// Table-level entry with a single value.
    pub fn single(keyword: Keyword, value: impl Into<String>) -> Self {
        Self::new(keyword, vec![value.into()])
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn with_cell(mut self, cell: impl Into<String>) -> Self {
        self.cell = Some(cell.into());
        self
    }
}

/// One normalized metadata fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub keyword: Keyword,
    pub language: String,
    pub variable: Option<String>,
    pub cell: Option<String>,
    /// Ordered values; order matters for list-valued keywords.
    pub value: Vec<String>,
    pub is_main_language: bool,
}

impl MetadataEntry {
    /// First value, if any.
    pub fn first_value(&self) -> Option<&str> {
        self.value.first().map(String::as_str)
    }

    /// Whether this entry has the given keyword/language/variable/cell tuple.
    pub fn matches(
        &self,
        keyword: Keyword,
        language: &str,
        variable: Option<&str>,
        cell: Option<&str>,
    ) -> bool {
        self.keyword == keyword
            && self.language == language
            && self.variable.as_deref() == variable
            && self.cell.as_deref() == cell
    }
}

/// All metadata entries for one table, together with the language order
/// derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub main_language: String,
    /// Declared languages, main language first.
    pub language_order: Vec<String>,
    entries: Vec<MetadataEntry>,
}

impl Catalog {
    pub fn new(
        main_language: impl Into<String>,
        language_order: Vec<String>,
        entries: Vec<MetadataEntry>,
    ) -> Self {
        Self {
            main_language: main_language.into(),
            language_order,
            entries,
        }
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<MetadataEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same languages, different entries.
    pub fn with_entries(&self, entries: Vec<MetadataEntry>) -> Self {
        Self {
            main_language: self.main_language.clone(),
            language_order: self.language_order.clone(),
            entries,
        }
    }

    /// Find the entry with an exact keyword/language/variable/cell tuple.
    pub fn find(
        &self,
        keyword: Keyword,
        language: &str,
        variable: Option<&str>,
        cell: Option<&str>,
    ) -> Option<&MetadataEntry> {
        self.entries
            .iter()
            .find(|entry| entry.matches(keyword, language, variable, cell))
    }

    /// All entries for a keyword, in catalog order.
    pub fn entries_for(&self, keyword: Keyword) -> impl Iterator<Item = &MetadataEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.keyword == keyword)
    }

    /// Value of a table-level main-language entry.
    pub fn main_value(&self, keyword: Keyword) -> Option<&[String]> {
        self.find(keyword, &self.main_language, None, None)
            .map(|entry| entry.value.as_slice())
    }

    /// Declared file encoding, if any.
    pub fn codepage(&self) -> Option<&str> {
        self.main_value(Keyword::Codepage)
            .and_then(|value| value.first())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Sort rank of a language: declared languages first, in declaration
    /// order; undeclared ones after, by name.
    pub fn language_rank<'a>(&self, language: &'a str) -> (usize, &'a str) {
        match self.language_order.iter().position(|l| l == language) {
            Some(index) => (index, ""),
            None => (self.language_order.len(), language),
        }
    }
}
