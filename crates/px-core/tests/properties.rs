//! Property tests for catalog ordering and cube completion.

use px_core::{convert, sort};
use px_model::{Catalog, ConvertOptions, DataTable, Keyword, MetadataEntry, RawMetadataEntry};
use proptest::prelude::*;

const KEYWORDS: &[Keyword] = &[
    Keyword::Title,
    Keyword::Contents,
    Keyword::Units,
    Keyword::Values,
    Keyword::Codes,
    Keyword::Note,
    Keyword::ValueNote,
];

fn arb_entry() -> impl Strategy<Value = MetadataEntry> {
    (
        prop::sample::select(KEYWORDS),
        prop::sample::select(vec!["sv", "en", "fo", "da"]),
        prop::option::of(prop::sample::select(vec!["Region", "Year", "Sex"])),
        prop::option::of(prop::sample::select(vec!["01", "02", "2019"])),
        prop::collection::vec("[a-z0-9 ]{0,8}", 0..4),
    )
        .prop_map(|(keyword, language, variable, cell, value)| MetadataEntry {
            keyword,
            language: language.to_string(),
            variable: variable.map(str::to_string),
            cell: cell.map(str::to_string),
            value,
            is_main_language: language == "sv",
        })
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(arb_entry(), 0..40).prop_map(|entries| {
        Catalog::new("sv", vec!["sv".to_string(), "en".to_string()], entries)
    })
}

/// Declared codes in a random declaration order, plus the subset observed.
fn arb_codelist() -> impl Strategy<Value = (Vec<String>, Vec<bool>)> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                Just((1..=n).map(|i| format!("{i:02}")).collect::<Vec<_>>()).prop_shuffle(),
                prop::collection::vec(any::<bool>(), n),
            )
        })
}

fn region_conversion(declared: &[String], observed: &[bool]) -> px_core::Conversion {
    let metadata = vec![
        RawMetadataEntry::new(Keyword::Languages, vec!["en".to_string()]),
        RawMetadataEntry::new(Keyword::Stub, vec!["Region".to_string()]),
        RawMetadataEntry::new(Keyword::Codes, declared.to_vec()).with_variable("Region"),
    ];
    let rows = declared
        .iter()
        .zip(observed)
        .filter(|(_, seen)| **seen)
        .map(|(code, _)| vec![code.clone(), "1".to_string()])
        .collect();
    let data = DataTable::with_rows(vec!["Region".to_string(), "Value".to_string()], rows);
    convert(metadata, &data, &ConvertOptions::default()).unwrap()
}

proptest! {
    #[test]
    fn sort_is_idempotent(catalog in arb_catalog()) {
        let once = sort(catalog);
        let twice = sort(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sort_ignores_input_order(catalog in arb_catalog(), seed in any::<u64>()) {
        let mut entries = catalog.entries().to_vec();
        let len = entries.len().max(1);
        entries.rotate_left((seed as usize) % len);
        entries.reverse();
        let shuffled = catalog.with_entries(entries);
        prop_assert_eq!(sort(catalog), sort(shuffled));
    }

    #[test]
    fn cube_never_has_fewer_rows_than_declared((declared, observed) in arb_codelist()) {
        let conversion = region_conversion(&declared, &observed);
        prop_assert!(conversion.cube.row_count() >= declared.len());
        let expected_missing = observed.iter().filter(|seen| !**seen).count();
        prop_assert_eq!(conversion.cube.missing_count(), expected_missing);
    }

    #[test]
    fn rows_follow_declared_sortorder((declared, observed) in arb_codelist()) {
        let conversion = region_conversion(&declared, &observed);
        let rows: Vec<String> = conversion
            .cube
            .row_keys()
            .map(|key| key.concat())
            .collect();
        prop_assert_eq!(rows, declared);
    }
}
