//! Codelists and classification roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether a classification variable forms output rows or output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassificationRole {
    Stub,
    Heading,
}

impl ClassificationRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "STUB",
            Self::Heading => "HEADING",
        }
    }
}

/// One declared code of a classification variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistEntry {
    /// Variable code the entry belongs to.
    pub variable: String,
    pub code: String,
    /// Main-language label; the code itself when no VALUES are declared.
    pub label: String,
    /// 1-based position in the declared list.
    pub sortorder: u32,
}

/// Ordered codes of one variable, indexed by code and by label.
#[derive(Debug, Clone, Default)]
pub struct Codelist {
    variable: String,
    entries: Vec<CodelistEntry>,
    by_code: BTreeMap<String, usize>,
    by_label: BTreeMap<String, usize>,
}

impl Codelist {
    /// Build a codelist from entries already in sortorder.
    pub fn new(variable: impl Into<String>, entries: Vec<CodelistEntry>) -> Self {
        let mut by_code = BTreeMap::new();
        let mut by_label = BTreeMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_code.entry(entry.code.clone()).or_insert(index);
            by_label.entry(entry.label.clone()).or_insert(index);
        }
        Self {
            variable: variable.into(),
            entries,
            by_code,
            by_label,
        }
    }

    /// A codelist with no declared codes.
    pub fn empty(variable: impl Into<String>) -> Self {
        Self::new(variable, Vec::new())
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn entries(&self) -> &[CodelistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CodelistEntry> {
        self.by_code
            .get(code)
            .and_then(|&index| self.entries.get(index))
    }

    /// Resolve an observed data value: exact code first, then label.
    pub fn resolve(&self, value: &str) -> Option<&CodelistEntry> {
        let trimmed = value.trim();
        self.by_code
            .get(trimmed)
            .or_else(|| self.by_label.get(trimmed))
            .and_then(|&index| self.entries.get(index))
    }

    pub fn sortorder(&self, code: &str) -> Option<u32> {
        self.get(code).map(|entry| entry.sortorder)
    }
}
