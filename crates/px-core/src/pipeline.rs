//! End-to-end conversion of metadata and data into a catalog and cube.
//!
//! # Stages
//!
//! 1. **normalize** - fill languages, merge rows, sort the catalog
//! 2. **context** - resolve classification variables, data columns, figures
//!    and time variables
//! 3. **codelists** - resolve each variable's declared codes
//! 4. **cube** - complete and pivot the data
//! 5. **supplement** - synthesize VALUES, TIMEVAL and LANGUAGE entries the
//!    target format needs but the input left out
//!
//! The returned catalog is sorted and the cube is read-only from here on.

use std::time::Instant;

use px_model::{
    Catalog, ConvertOptions, DataCube, DataTable, Keyword, MetadataEntry, RawMetadataEntry,
    Result,
};
use tracing::{debug, info, info_span, warn};

use crate::catalog::{normalize, sort};
use crate::codelist::{resolve_codelist, variable_entry};
use crate::context::ConversionContext;
use crate::cube::{Codelists, build_data_cube};
use crate::timeval::timeval_value;

/// Keywords a publishable table is expected to carry.
pub const RECOMMENDED_KEYWORDS: &[Keyword] = &[
    Keyword::Decimals,
    Keyword::Matrix,
    Keyword::SubjectCode,
    Keyword::SubjectArea,
    Keyword::Title,
    Keyword::Contents,
    Keyword::Units,
];

/// Result of one conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Normalized, supplemented and sorted catalog.
    pub catalog: Catalog,
    pub cube: DataCube,
    pub context: ConversionContext,
    pub codelists: Codelists,
}

/// Counts describing a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub main_language: String,
    pub languages: usize,
    pub entries: usize,
    pub stub_variables: usize,
    pub heading_variables: usize,
    pub figures_variable: String,
    pub time_variable: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub missing: usize,
}

impl Conversion {
    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            main_language: self.catalog.main_language.clone(),
            languages: self.catalog.language_order.len(),
            entries: self.catalog.len(),
            stub_variables: self.context.stub.len(),
            heading_variables: self.context.heading.len(),
            figures_variable: self.context.figures_variable.clone(),
            time_variable: self.context.time_variable.clone(),
            rows: self.cube.row_count(),
            columns: self.cube.column_count(),
            missing: self.cube.missing_count(),
        }
    }
}

/// Convert raw metadata rows and a data table.
pub fn convert(
    raw: Vec<RawMetadataEntry>,
    data: &DataTable,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let span = info_span!("convert", rows = data.row_count());
    let _guard = span.enter();
    let catalog = info_span!("normalize").in_scope(|| normalize(raw))?;
    convert_normalized(catalog, data, options)
}

/// Convert an already normalized catalog, e.g. one loaded from a snapshot.
pub fn convert_catalog(
    catalog: Catalog,
    data: &DataTable,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let span = info_span!("convert", rows = data.row_count());
    let _guard = span.enter();
    convert_normalized(sort(catalog), data, options)
}

fn convert_normalized(
    catalog: Catalog,
    data: &DataTable,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let start = Instant::now();
    let context =
        info_span!("context").in_scope(|| ConversionContext::build(&catalog, data, options))?;

    let codelists = info_span!("codelists").in_scope(|| -> Result<Codelists> {
        let mut codelists = Codelists::new();
        for variable in context.variables.iter() {
            let codelist = resolve_codelist(&catalog, &context.variables, variable)?;
            codelists.insert(variable.code.clone(), codelist);
        }
        Ok(codelists)
    })?;

    let cube = info_span!("cube").in_scope(|| build_data_cube(&context, &codelists, data))?;

    let catalog =
        info_span!("supplement").in_scope(|| supplement(catalog, &context, &codelists, &cube));
    warn_missing_recommended(&catalog);

    info!(
        entries = catalog.len(),
        rows = cube.row_count(),
        columns = cube.column_count(),
        duration_ms = start.elapsed().as_millis(),
        "conversion complete"
    );
    Ok(Conversion {
        catalog,
        cube,
        context,
        codelists,
    })
}

/// Add entries derived from the cube and return the catalog sorted.
fn supplement(
    catalog: Catalog,
    context: &ConversionContext,
    codelists: &Codelists,
    cube: &DataCube,
) -> Catalog {
    let mut added: Vec<MetadataEntry> = Vec::new();

    if context.options.synthesize_values {
        for axis in cube.stub.iter().chain(&cube.heading) {
            let Some(variable) = context.variable(&axis.variable) else {
                continue;
            };
            let labels: Vec<String> = axis
                .codes()
                .iter()
                .map(|code| {
                    codelists
                        .get(&variable.code)
                        .and_then(|codelist| codelist.get(&code.code))
                        .map_or_else(|| code.code.clone(), |entry| entry.label.clone())
                })
                .collect();
            for (language, name) in &variable.labels {
                if variable_entry(&catalog, &context.variables, variable, Keyword::Values, language)
                    .is_none()
                {
                    debug!(variable = %variable.code, language = %language, "Synthesized VALUES");
                    added.push(entry(
                        Keyword::Values,
                        language,
                        Some(name),
                        labels.clone(),
                        &context.main_language,
                    ));
                }
            }
        }
    }

    if let Some(time) = context.time_variable.as_deref().and_then(|code| context.variable(code)) {
        let axis = cube
            .stub
            .iter()
            .chain(&cube.heading)
            .find(|axis| axis.variable == time.code);
        let codes: Vec<&str> = axis
            .map(|axis| axis.codes().iter().map(|code| code.code.as_str()).collect())
            .unwrap_or_default();
        match timeval_value(&codes) {
            Some(value) => {
                for (language, name) in &time.labels {
                    if variable_entry(&catalog, &context.variables, time, Keyword::Timeval, language)
                        .is_none()
                    {
                        added.push(entry(
                            Keyword::Timeval,
                            language,
                            Some(name),
                            value.clone(),
                            &context.main_language,
                        ));
                    }
                }
                debug!(variable = %time.code, head = ?value.first(), "Synthesized TIMEVAL");
            }
            None => warn!(
                variable = %time.code,
                "Time codes do not share one known pattern; TIMEVAL not synthesized"
            ),
        }
    }

    if context.options.synthesize_language
        && context.language_order.len() > 1
        && catalog.entries_for(Keyword::Language).next().is_none()
    {
        added.push(entry(
            Keyword::Language,
            &context.main_language,
            None,
            vec![context.main_language.clone()],
            &context.main_language,
        ));
    }

    if added.is_empty() {
        return catalog;
    }
    info!(count = added.len(), "Supplemented metadata entries");
    let mut entries = catalog.entries().to_vec();
    entries.extend(added);
    sort(catalog.with_entries(entries))
}

fn entry(
    keyword: Keyword,
    language: &str,
    variable: Option<&String>,
    value: Vec<String>,
    main_language: &str,
) -> MetadataEntry {
    MetadataEntry {
        keyword,
        language: language.to_string(),
        variable: variable.cloned(),
        cell: None,
        value,
        is_main_language: language == main_language,
    }
}

fn warn_missing_recommended(catalog: &Catalog) {
    for keyword in RECOMMENDED_KEYWORDS {
        if catalog.entries_for(*keyword).next().is_none() {
            warn!(keyword = %keyword, "Recommended keyword is missing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_model::PxError;

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

    fn metadata() -> Vec<RawMetadataEntry> {
        vec![
            list(Keyword::Languages, &["sv", "en"]),
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
        ]
    }

    #[test]
    fn test_supplements_timeval_values_and_language() {
        let data = table(
            &["region", "år", "Folkmängd"],
            &[&["01", "2019", "5"], &["02", "2020", "6"]],
        );
        let conversion = convert(metadata(), &data, &ConvertOptions::default()).unwrap();
        let catalog = &conversion.catalog;

        let timeval_en = catalog.find(Keyword::Timeval, "en", Some("year"), None).unwrap();
        assert_eq!(timeval_en.value, vec!["TLIST(A1,\"2019\"-\"2020\")"]);
        assert!(catalog.find(Keyword::Timeval, "sv", Some("år"), None).is_some());

        let years = catalog.find(Keyword::Values, "sv", Some("år"), None).unwrap();
        assert_eq!(years.value, vec!["2019", "2020"]);
        assert!(catalog.find(Keyword::Values, "en", Some("year"), None).is_some());

        let language = catalog.find(Keyword::Language, "sv", None, None).unwrap();
        assert_eq!(language.value, vec!["sv"]);

        let summary = conversion.summary();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.missing, 2);
        assert_eq!(summary.time_variable.as_deref(), Some("år"));
    }

    #[test]
    fn test_synthesis_can_be_disabled() {
        let data = table(&["region", "år", "Folkmängd"], &[&["01", "2019", "5"]]);
        let options = ConvertOptions::default().without_synthesis();
        let conversion = convert(metadata(), &data, &options).unwrap();
        assert!(conversion.catalog.entries_for(Keyword::Language).next().is_none());
        assert!(
            conversion
                .catalog
                .find(Keyword::Values, "sv", Some("år"), None)
                .is_none()
        );
        // TIMEVAL follows the time variable, not the synthesis switches.
        assert!(conversion.catalog.entries_for(Keyword::Timeval).next().is_some());
    }

    #[test]
    fn test_errors_propagate_from_each_stage() {
        let data = table(&["region", "år", "Folkmängd"], &[&["09", "2019", "5"]]);
        let err = convert(metadata(), &data, &ConvertOptions::default()).unwrap_err();
        assert_eq!(err, PxError::unresolvable_code("region", "09"));
    }

    #[test]
    fn test_convert_catalog_matches_convert() {
        let data = table(&["region", "år", "Folkmängd"], &[&["01", "2019", "5"]]);
        let options = ConvertOptions::default();
        let first = convert(metadata(), &data, &options).unwrap();
        let again = convert_catalog(first.catalog.clone(), &data, &options).unwrap();
        assert_eq!(again.catalog, first.catalog);
        // Synthesized VALUES make observed codes declared on the second pass.
        assert_eq!(again.cube.to_data_table(), first.cube.to_data_table());
    }
}
