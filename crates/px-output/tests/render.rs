//! Rendering tests against complete conversions.

use px_core::{Conversion, convert};
use px_model::{
    Catalog, ConvertOptions, DataCube, DataTable, Keyword, LineEnding, MetadataEntry,
    RawMetadataEntry,
};
use px_output::{DATA_KEYWORD, render_lines, render_to_string};

fn list(keyword: Keyword, values: &[&str]) -> RawMetadataEntry {
    RawMetadataEntry::new(keyword, values.iter().map(|v| (*v).to_string()).collect())
}

fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
    DataTable::with_rows(
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| (*v).to_string()).collect())
            .collect(),
    )
}

fn population_conversion() -> Conversion {
    let metadata = vec![
        RawMetadataEntry::single(Keyword::Codepage, "utf-8"),
        list(Keyword::Languages, &["sv", "en"]),
        RawMetadataEntry::single(Keyword::Decimals, "0"),
        RawMetadataEntry::single(Keyword::Matrix, "BE0101"),
        RawMetadataEntry::single(Keyword::SubjectCode, "BE"),
        RawMetadataEntry::single(Keyword::SubjectArea, "Befolkning"),
        RawMetadataEntry::single(Keyword::SubjectArea, "Population").with_language("en"),
        RawMetadataEntry::single(Keyword::Title, "Folkmängd efter region och år"),
        RawMetadataEntry::single(Keyword::Title, "Population by region and year")
            .with_language("en"),
        RawMetadataEntry::single(Keyword::Contents, "Folkmängd"),
        RawMetadataEntry::single(Keyword::Contents, "Population").with_language("en"),
        RawMetadataEntry::single(Keyword::Units, "antal"),
        RawMetadataEntry::single(Keyword::Units, "number").with_language("en"),
        list(Keyword::Stub, &["region"]),
        list(Keyword::Stub, &["region"]).with_language("en"),
        list(Keyword::Heading, &["år"]),
        list(Keyword::Heading, &["year"]).with_language("en"),
        list(Keyword::Codes, &["01", "02"]).with_variable("region"),
        list(Keyword::Values, &["Norr", "Syd"]).with_variable("region"),
        list(Keyword::Values, &["North", "South"])
            .with_language("en")
            .with_variable("region"),
        RawMetadataEntry::single(Keyword::VariableType, "time").with_variable("år"),
    ];
    let data = table(
        &["region", "år", "Folkmängd"],
        &[
            &["01", "2019", "100"],
            &["01", "2020", "110"],
            &["Syd", "2019", "95"],
        ],
    );
    convert(metadata, &data, &ConvertOptions::default()).unwrap()
}

fn data_section(lines: &[String]) -> Vec<String> {
    let start = lines
        .iter()
        .position(|line| line == DATA_KEYWORD)
        .unwrap();
    lines[start + 1..lines.len() - 1].to_vec()
}

#[test]
fn renders_complete_file() {
    let conversion = population_conversion();
    let text = render_to_string(
        &conversion.catalog,
        &conversion.cube,
        &ConvertOptions::default(),
    );
    assert!(text.ends_with(";\r\n"));
    insta::assert_snapshot!("complete_file", text);
}

#[test]
fn rendering_is_deterministic() {
    let options = ConvertOptions::default().with_line_ending(LineEnding::Lf);
    let first = population_conversion();
    let second = population_conversion();
    let a = render_to_string(&first.catalog, &first.cube, &options);
    let b = render_to_string(&first.catalog, &first.cube, &options);
    let c = render_to_string(&second.catalog, &second.cube, &options);
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_eq!(a.as_bytes(), c.as_bytes());
    assert!(!a.contains('\r'));
}

#[test]
fn data_rows_follow_heading_order() {
    let metadata = vec![
        list(Keyword::Languages, &["en"]),
        list(Keyword::Stub, &["Region"]),
        list(Keyword::Heading, &["Year"]),
        list(Keyword::Codes, &["01", "02"]).with_variable("Region"),
        list(Keyword::Values, &["2021", "2019", "2020"]).with_variable("Year"),
    ];
    let data = table(
        &["Region", "Year", "Population"],
        &[
            &["01", "2019", "19"],
            &["01", "2020", "20"],
            &["01", "2021", "21"],
            &["02", "2019", "190"],
            &["02", "2020", "200"],
            &["02", "2021", "210"],
        ],
    );
    let conversion = convert(metadata, &data, &ConvertOptions::default()).unwrap();
    let lines = render_lines(&conversion.catalog, &conversion.cube, &ConvertOptions::default());
    let rows = data_section(&lines);
    assert_eq!(rows, vec!["21 19 20", "210 190 200"]);
    for row in &rows {
        assert_eq!(row.split(' ').count(), 3);
    }
    assert_eq!(lines.last().map(String::as_str), Some(";"));
}

#[test]
fn missing_and_symbol_figures_are_quoted() {
    let metadata = vec![
        list(Keyword::Languages, &["en"]),
        list(Keyword::Stub, &["Region"]),
        list(Keyword::Codes, &["01", "02", "03"]).with_variable("Region"),
    ];
    let data = table(&["Region", "Population"], &[&["01", "12.5"], &["02", ".."]]);
    let conversion = convert(metadata, &data, &ConvertOptions::default()).unwrap();
    let options = ConvertOptions::default().with_missing_marker("..");
    let lines = render_lines(&conversion.catalog, &conversion.cube, &options);
    assert_eq!(data_section(&lines), vec!["12.5", "\"..\"", "\"..\""]);
}

#[test]
fn long_list_value_folds_into_two_lines() {
    // 20 tokens of 12 characters render as 20 * 15 = 300 characters.
    let value: Vec<String> = (0..20).map(|i| format!("token{i:07}")).collect();
    let catalog = Catalog::new(
        "en",
        vec!["en".to_string()],
        vec![MetadataEntry {
            keyword: Keyword::Note,
            language: "en".to_string(),
            variable: None,
            cell: None,
            value,
            is_main_language: true,
        }],
    );
    let cube = DataCube::new_missing(Vec::new(), Vec::new(), "Value");
    let lines = render_lines(&catalog, &cube, &ConvertOptions::default());
    let data = lines
        .iter()
        .position(|line| line == DATA_KEYWORD)
        .unwrap();
    let folded = &lines[..data];

    assert_eq!(folded.len(), 2);
    assert!(folded[0].starts_with("NOTE=\"token0000000\","));
    assert!(folded[0].chars().count() < 256);
    assert!(!folded[1].starts_with("NOTE"));
    assert!(folded[1].ends_with("\"token0000019\";"));
    for line in folded {
        assert_eq!(line.matches('"').count() % 2, 0, "{line}");
        assert!(line.ends_with(',') || line.ends_with(';'));
    }
}
