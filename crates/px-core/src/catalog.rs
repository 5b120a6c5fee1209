//! Metadata catalog normalization and ordering.
//!
//! Normalization fills every entry's language, derives the main language
//! and language order from LANGUAGES, folds language-independent keywords
//! onto the main language and merges entries that end up sharing a
//! keyword/language/variable/cell tuple. The result is returned sorted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use px_model::{Catalog, Keyword, MetadataEntry, PxError, RawMetadataEntry, Result};

/// Normalize raw metadata rows into a sorted catalog.
pub fn normalize(raw: Vec<RawMetadataEntry>) -> Result<Catalog> {
    if raw.is_empty() {
        return Err(PxError::input_shape("metadata table has no entries"));
    }
    for entry in &raw {
        entry
            .keyword
            .check_scope(entry.variable.as_deref(), entry.cell.as_deref())?;
    }

    let (main_language, language_order) = derive_languages(&raw)?;
    tracing::debug!(main = %main_language, languages = ?language_order, "Derived language order");

    let mut merged: BTreeMap<EntryKey, Vec<String>> = BTreeMap::new();
    let mut relabelled: Vec<(EntryKey, Vec<String>)> = Vec::new();
    let mut undeclared: BTreeSet<String> = BTreeSet::new();

    for entry in raw {
        let language = entry
            .language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(&main_language)
            .to_string();
        let key = EntryKey {
            keyword: entry.keyword,
            language,
            variable: trimmed(entry.variable),
            cell: trimmed(entry.cell),
        };
        if !key.keyword.is_language_dependent() && key.language != main_language {
            relabelled.push((key, entry.value));
            continue;
        }
        if !language_order.contains(&key.language) {
            undeclared.insert(key.language.clone());
        }
        merged.entry(key).or_default().extend(entry.value);
    }

    for (mut key, value) in relabelled {
        let original = std::mem::replace(&mut key.language, main_language.clone());
        if merged.contains_key(&key) {
            tracing::warn!(
                keyword = %key.keyword,
                language = %original,
                "Dropping language-independent keyword given for a non-main language"
            );
            continue;
        }
        tracing::warn!(
            keyword = %key.keyword,
            language = %original,
            main = %main_language,
            "Moving language-independent keyword to the main language"
        );
        merged.insert(key, value);
    }

    for language in &undeclared {
        tracing::warn!(language = %language, "Language is used but not listed in LANGUAGES");
    }

    let entries = merged
        .into_iter()
        .map(|(key, value)| MetadataEntry {
            is_main_language: key.language == main_language,
            keyword: key.keyword,
            language: key.language,
            variable: key.variable,
            cell: key.cell,
            value,
        })
        .collect();
    let catalog = sort(Catalog::new(main_language, language_order, entries));
    tracing::info!(count = catalog.len(), "Normalized metadata entries");
    Ok(catalog)
}

/// Put entries in canonical order. Sorting a sorted catalog is a no-op.
pub fn sort(catalog: Catalog) -> Catalog {
    let mut entries = catalog.entries().to_vec();
    entries.sort_by(|a, b| compare_entries(&catalog, a, b));
    catalog.with_entries(entries)
}

/// Canonical entry order: keyword table position, then language (declared
/// order, undeclared last by name), then variable (table-level first, then
/// by name), then cell likewise.
pub fn compare_entries(catalog: &Catalog, a: &MetadataEntry, b: &MetadataEntry) -> Ordering {
    a.keyword
        .cmp(&b.keyword)
        .then_with(|| {
            catalog
                .language_rank(&a.language)
                .cmp(&catalog.language_rank(&b.language))
        })
        .then_with(|| a.variable.cmp(&b.variable))
        .then_with(|| a.cell.cmp(&b.cell))
        .then_with(|| a.value.cmp(&b.value))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    keyword: Keyword,
    language: String,
    variable: Option<String>,
    cell: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn derive_languages(raw: &[RawMetadataEntry]) -> Result<(String, Vec<String>)> {
    let declared = raw
        .iter()
        .find(|entry| entry.keyword == Keyword::Languages)
        .map(|entry| distinct_languages(&entry.value))
        .filter(|languages| !languages.is_empty());
    if let Some(order) = declared {
        let main = order[0].clone();
        return Ok((main, order));
    }

    if let Some(language) = raw
        .iter()
        .find(|entry| entry.keyword == Keyword::Language)
        .and_then(|entry| entry.value.first())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        return Ok((language.clone(), vec![language]));
    }

    if let Some(unset) = raw.iter().find(|entry| entry.language.is_none()) {
        return Err(PxError::AmbiguousLanguage {
            keyword: unset.keyword.name().to_string(),
            variable: unset.variable.clone(),
        });
    }
    let explicit: BTreeSet<&str> = raw
        .iter()
        .filter_map(|entry| entry.language.as_deref())
        .map(str::trim)
        .collect();
    match explicit.into_iter().collect::<Vec<_>>().as_slice() {
        [only] => Ok(((*only).to_string(), vec![(*only).to_string()])),
        _ => Err(PxError::AmbiguousLanguage {
            keyword: Keyword::Languages.name().to_string(),
            variable: None,
        }),
    }
}

fn distinct_languages(values: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for value in values {
        let language = value.trim();
        if !language.is_empty() && !order.iter().any(|known| known == language) {
            order.push(language.to_string());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages(values: &[&str]) -> RawMetadataEntry {
        RawMetadataEntry::new(
            Keyword::Languages,
            values.iter().map(|v| (*v).to_string()).collect(),
        )
    }

    #[test]
    fn test_unset_language_becomes_main() {
        let catalog = normalize(vec![
            languages(&["sv", "en"]),
            RawMetadataEntry::single(Keyword::Title, "Folkmängd"),
            RawMetadataEntry::single(Keyword::Title, "Population").with_language("en"),
        ])
        .unwrap();
        assert_eq!(catalog.main_language, "sv");
        let titles: Vec<&MetadataEntry> = catalog.entries_for(Keyword::Title).collect();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].language, "sv");
        assert!(titles[0].is_main_language);
        assert_eq!(titles[1].language, "en");
        assert!(!titles[1].is_main_language);
    }

    #[test]
    fn test_missing_languages_with_unset_language_fails() {
        let err = normalize(vec![
            RawMetadataEntry::single(Keyword::Title, "Population").with_language("en"),
            RawMetadataEntry::single(Keyword::Values, "North").with_variable("Region"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            PxError::AmbiguousLanguage {
                keyword: "VALUES".to_string(),
                variable: Some("Region".to_string()),
            }
        );
    }

    #[test]
    fn test_single_explicit_language_is_main() {
        let catalog = normalize(vec![
            RawMetadataEntry::single(Keyword::Title, "Population").with_language("en"),
        ])
        .unwrap();
        assert_eq!(catalog.main_language, "en");
        assert_eq!(catalog.language_order, vec!["en"]);
    }

    #[test]
    fn test_language_entry_names_main_without_languages() {
        let catalog = normalize(vec![
            RawMetadataEntry::single(Keyword::Language, "fi"),
            RawMetadataEntry::single(Keyword::Title, "Väestö"),
        ])
        .unwrap();
        assert_eq!(catalog.main_language, "fi");
    }

    #[test]
    fn test_language_independent_keyword_folds_to_main() {
        let catalog = normalize(vec![
            languages(&["sv", "en"]),
            RawMetadataEntry::single(Keyword::Decimals, "1"),
            RawMetadataEntry::single(Keyword::Decimals, "2").with_language("en"),
            RawMetadataEntry::single(Keyword::Matrix, "BE0101").with_language("en"),
        ])
        .unwrap();
        let decimals: Vec<&MetadataEntry> = catalog.entries_for(Keyword::Decimals).collect();
        assert_eq!(decimals.len(), 1);
        assert_eq!(decimals[0].value, vec!["1"]);
        let matrix = catalog.find(Keyword::Matrix, "sv", None, None).unwrap();
        assert_eq!(matrix.value, vec!["BE0101"]);
    }

    #[test]
    fn test_rows_with_same_tuple_merge_in_order() {
        let catalog = normalize(vec![
            languages(&["sv"]),
            RawMetadataEntry::single(Keyword::Codes, "01").with_variable("Region"),
            RawMetadataEntry::single(Keyword::Codes, "02").with_variable("Region"),
        ])
        .unwrap();
        let codes = catalog
            .find(Keyword::Codes, "sv", Some("Region"), None)
            .unwrap();
        assert_eq!(codes.value, vec!["01", "02"]);
    }

    #[test]
    fn test_scope_is_validated() {
        let err = normalize(vec![
            languages(&["sv"]),
            RawMetadataEntry::single(Keyword::Values, "North"),
        ])
        .unwrap_err();
        assert!(matches!(err, PxError::InvalidScope { .. }));
    }

    #[test]
    fn test_sort_orders_variables_and_cells() {
        let catalog = normalize(vec![
            languages(&["sv", "en"]),
            RawMetadataEntry::single(Keyword::Note, "cell").with_variable("Region").with_cell("01"),
            RawMetadataEntry::single(Keyword::Note, "variable").with_variable("Region"),
            RawMetadataEntry::single(Keyword::Note, "table"),
            RawMetadataEntry::single(Keyword::Note, "english").with_language("en"),
        ])
        .unwrap();
        let notes: Vec<&str> = catalog
            .entries_for(Keyword::Note)
            .filter_map(MetadataEntry::first_value)
            .collect();
        assert_eq!(notes, vec!["table", "variable", "cell", "english"]);
    }

    #[test]
    fn test_undeclared_language_sorts_last() {
        let catalog = normalize(vec![
            languages(&["sv", "en"]),
            RawMetadataEntry::single(Keyword::Title, "fo").with_language("fo"),
            RawMetadataEntry::single(Keyword::Title, "en").with_language("en"),
            RawMetadataEntry::single(Keyword::Title, "sv"),
        ])
        .unwrap();
        let order: Vec<&str> = catalog
            .entries_for(Keyword::Title)
            .map(|entry| entry.language.as_str())
            .collect();
        assert_eq!(order, vec!["sv", "en", "fo"]);
    }
}
