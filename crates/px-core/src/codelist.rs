//! Codelist and time-variable resolution.

use px_model::{Catalog, Codelist, CodelistEntry, Keyword, MetadataEntry, PxError, Result};

use crate::variables::{ClassificationVariable, VariableSet};

/// Value of VARIABLE-TYPE marking the time classification.
pub const TIME_VARIABLE_TYPE: &str = "time";

/// Ordered codes of one variable from its main-language CODES and VALUES.
///
/// Sortorder is the 1-based declaration position. With only VALUES the
/// labels double as codes; with only CODES the codes double as labels.
pub fn resolve_codelist(
    catalog: &Catalog,
    variables: &VariableSet,
    variable: &ClassificationVariable,
) -> Result<Codelist> {
    let main = catalog.main_language.as_str();
    let codes = variable_entry(catalog, variables, variable, Keyword::Codes, main);
    let values = variable_entry(catalog, variables, variable, Keyword::Values, main);

    let pairs: Vec<(String, String)> = match (codes, values) {
        (Some(codes), Some(values)) => {
            if codes.value.len() != values.value.len() {
                return Err(PxError::CodelistMismatch {
                    variable: variable.code.clone(),
                    codes: codes.value.len(),
                    values: values.value.len(),
                });
            }
            codes
                .value
                .iter()
                .zip(&values.value)
                .map(|(code, label)| (code.trim().to_string(), label.trim().to_string()))
                .collect()
        }
        (Some(only), None) | (None, Some(only)) => only
            .value
            .iter()
            .map(|code| (code.trim().to_string(), code.trim().to_string()))
            .collect(),
        (None, None) => Vec::new(),
    };

    let entries = pairs
        .into_iter()
        .zip(1u32..)
        .map(|((code, label), sortorder)| CodelistEntry {
            variable: variable.code.clone(),
            code,
            label,
            sortorder,
        })
        .collect::<Vec<_>>();
    tracing::debug!(
        variable = %variable.code,
        codes = entries.len(),
        "Resolved codelist"
    );
    Ok(Codelist::new(variable.code.clone(), entries))
}

/// The variable declared with VARIABLE-TYPE "time", if any.
pub fn resolve_time_variable<'a>(
    catalog: &Catalog,
    variables: &'a VariableSet,
) -> Result<Option<&'a ClassificationVariable>> {
    let mut found: Vec<&'a ClassificationVariable> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();
    for entry in catalog.entries_for(Keyword::VariableType) {
        let is_time = entry
            .first_value()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(TIME_VARIABLE_TYPE));
        if !is_time {
            continue;
        }
        let Some(name) = entry.variable.as_deref() else {
            continue;
        };
        match variables.find(&entry.language, name) {
            Some(variable) => {
                if !found.iter().any(|known| known.code == variable.code) {
                    found.push(variable);
                }
            }
            None => unknown.push(name.to_string()),
        }
    }
    for name in &unknown {
        tracing::warn!(variable = %name, "VARIABLE-TYPE names a variable that is not in STUB or HEADING");
    }

    match found.as_slice() {
        [] => Ok(None),
        [only] => {
            tracing::debug!(variable = %only.code, "Time variable");
            Ok(Some(*only))
        }
        _ => Err(PxError::MultipleTimeVariables {
            variables: found.iter().map(|variable| variable.code.clone()).collect(),
        }),
    }
}

/// Variable-level entry (no cell) of `keyword` in `language` naming `variable`.
pub fn variable_entry<'c>(
    catalog: &'c Catalog,
    variables: &VariableSet,
    variable: &ClassificationVariable,
    keyword: Keyword,
    language: &str,
) -> Option<&'c MetadataEntry> {
    catalog.entries_for(keyword).find(|entry| {
        entry.language == language
            && entry.cell.is_none()
            && entry
                .variable
                .as_deref()
                .and_then(|name| variables.find(language, name))
                .is_some_and(|found| found.code == variable.code)
    })
}
