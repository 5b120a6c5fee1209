//! Classification variables and their codes.
//!
//! STUB and HEADING list variable labels per language, aligned by position.
//! A variable's code in a language is its VARIABLECODE override when one is
//! declared, otherwise the main-language label at the same position. The
//! variable's identity is its main-language code: the main override when
//! one exists, else the main-language label.

use std::collections::BTreeMap;

use px_model::{Catalog, ClassificationRole, Keyword, PxError, Result};

/// One STUB or HEADING variable with its labels and codes per language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationVariable {
    /// Identity of the variable: its main-language code.
    pub code: String,
    pub role: ClassificationRole,
    /// Position within its STUB or HEADING list.
    pub index: usize,
    /// Label per language.
    pub labels: BTreeMap<String, String>,
    /// Resolved code per language.
    pub codes: BTreeMap<String, String>,
}

impl ClassificationVariable {
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    pub fn code_in(&self, language: &str) -> Option<&str> {
        self.codes.get(language).map(String::as_str)
    }

    /// Whether an entry in `language` naming `name` refers to this variable.
    pub fn is_named(&self, language: &str, name: &str, main_language: &str) -> bool {
        let name = name.trim();
        self.label(language) == Some(name)
            || self.code_in(language) == Some(name)
            || self.code == name
            || self.label(main_language) == Some(name)
    }
}

/// All classification variables of a table, STUB first, then HEADING.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSet {
    main_language: String,
    variables: Vec<ClassificationVariable>,
}

impl VariableSet {
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationVariable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn with_role(&self, role: ClassificationRole) -> impl Iterator<Item = &ClassificationVariable> {
        self.variables.iter().filter(move |variable| variable.role == role)
    }

    /// Variable by its main-language code.
    pub fn get(&self, code: &str) -> Option<&ClassificationVariable> {
        self.variables.iter().find(|variable| variable.code == code)
    }

    /// Variable named by an entry in `language`.
    pub fn find(&self, language: &str, name: &str) -> Option<&ClassificationVariable> {
        self.variables
            .iter()
            .find(|variable| variable.is_named(language, name, &self.main_language))
    }

    /// Code for the variable at `index` of `role` (`STUB` or `HEADING`) in `language`.
    pub fn code_for(&self, keyword: Keyword, language: &str, index: usize) -> Option<&str> {
        let role = role_of(keyword)?;
        self.variables
            .iter()
            .find(|variable| variable.role == role && variable.index == index)
            .and_then(|variable| variable.code_in(language))
    }
}

/// Resolve every STUB/HEADING variable's code in every language.
pub fn resolve_variable_codes(catalog: &Catalog) -> Result<VariableSet> {
    let main = catalog.main_language.as_str();
    let mut variables = Vec::new();
    for keyword in [Keyword::Stub, Keyword::Heading] {
        let Some(role) = role_of(keyword) else {
            continue;
        };
        let main_labels = labels_for(catalog, keyword, main);
        for (index, main_label) in main_labels.iter().enumerate() {
            let main_code = variable_code_override(catalog, main, main_label)
                .unwrap_or(main_label)
                .to_string();
            variables.push(ClassificationVariable {
                code: main_code,
                role,
                index,
                labels: BTreeMap::new(),
                codes: BTreeMap::new(),
            });
        }

        for entry in catalog.entries_for(keyword) {
            let labels = labels_for(catalog, keyword, &entry.language);
            if labels.len() != main_labels.len() {
                return Err(PxError::invalid_scope(
                    keyword.name(),
                    format!(
                        "language '{}' lists {} variables, main language '{}' lists {}",
                        entry.language,
                        labels.len(),
                        main,
                        main_labels.len()
                    ),
                ));
            }
            for (index, label) in labels.iter().enumerate() {
                let Some(variable) = variables
                    .iter_mut()
                    .find(|variable| variable.role == role && variable.index == index)
                else {
                    continue;
                };
                let fallback = if entry.language == main {
                    &variable.code
                } else {
                    main_labels.get(index).unwrap_or(&variable.code)
                };
                let code = variable_code_override(catalog, &entry.language, label)
                    .unwrap_or(fallback)
                    .to_string();
                variable.labels.insert(entry.language.clone(), label.clone());
                variable.codes.insert(entry.language.clone(), code);
            }
        }
    }

    let mut seen: Vec<&str> = Vec::new();
    for variable in &variables {
        if seen.contains(&variable.code.as_str()) {
            return Err(PxError::invalid_scope(
                "VARIABLECODE",
                format!("variable code '{}' is used twice", variable.code),
            ));
        }
        seen.push(&variable.code);
    }

    tracing::debug!(count = variables.len(), "Resolved classification variables");
    Ok(VariableSet {
        main_language: main.to_string(),
        variables,
    })
}

fn role_of(keyword: Keyword) -> Option<ClassificationRole> {
    match keyword {
        Keyword::Stub => Some(ClassificationRole::Stub),
        Keyword::Heading => Some(ClassificationRole::Heading),
        _ => None,
    }
}

fn labels_for(catalog: &Catalog, keyword: Keyword, language: &str) -> Vec<String> {
    catalog
        .find(keyword, language, None, None)
        .map(|entry| {
            entry
                .value
                .iter()
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn variable_code_override<'a>(catalog: &'a Catalog, language: &str, label: &str) -> Option<&'a str> {
    catalog
        .find(Keyword::VariableCode, language, Some(label), None)
        .and_then(|entry| entry.first_value())
        .map(str::trim)
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize;
    use px_model::RawMetadataEntry;

    fn list(keyword: Keyword, values: &[&str]) -> RawMetadataEntry {
        RawMetadataEntry::new(keyword, values.iter().map(|v| (*v).to_string()).collect())
    }

    fn bilingual() -> Catalog {
        normalize(vec![
            list(Keyword::Languages, &["sv", "en"]),
            list(Keyword::Stub, &["region", "kön"]),
            list(Keyword::Stub, &["region", "sex"]).with_language("en"),
            list(Keyword::Heading, &["år"]),
            list(Keyword::Heading, &["year"]).with_language("en"),
            RawMetadataEntry::single(Keyword::VariableCode, "Tid").with_variable("år"),
            RawMetadataEntry::single(Keyword::VariableCode, "Sex")
                .with_language("en")
                .with_variable("sex"),
        ])
        .unwrap()
    }

    #[test]
    fn test_codes_fall_back_to_main() {
        let variables = resolve_variable_codes(&bilingual()).unwrap();
        assert_eq!(variables.len(), 3);

        assert_eq!(variables.code_for(Keyword::Stub, "sv", 0), Some("region"));
        assert_eq!(variables.code_for(Keyword::Stub, "sv", 1), Some("kön"));
        assert_eq!(variables.code_for(Keyword::Stub, "en", 1), Some("Sex"));
        assert_eq!(variables.code_for(Keyword::Heading, "sv", 0), Some("Tid"));
        assert_eq!(variables.code_for(Keyword::Heading, "en", 0), Some("år"));
        assert_eq!(variables.code_for(Keyword::Stub, "en", 0), Some("region"));
        assert_eq!(variables.code_for(Keyword::Values, "en", 0), None);
    }

    #[test]
    fn test_other_language_falls_back_to_main_label_not_override() {
        let variables = resolve_variable_codes(&bilingual()).unwrap();
        let time = variables.get("Tid").unwrap();
        assert_eq!(time.code_in("sv"), Some("Tid"));
        assert_eq!(time.code_in("en"), Some("år"));
        assert!(time.is_named("en", "Tid", "sv"));
        assert!(time.is_named("en", "year", "sv"));
    }

    #[test]
    fn test_find_by_label_in_any_language() {
        let variables = resolve_variable_codes(&bilingual()).unwrap();
        assert_eq!(variables.find("en", "year").map(|v| v.code.as_str()), Some("Tid"));
        assert_eq!(variables.find("en", "år").map(|v| v.code.as_str()), Some("Tid"));
        assert_eq!(variables.find("sv", "Tid").map(|v| v.code.as_str()), Some("Tid"));
        assert!(variables.find("en", "age").is_none());
    }

    #[test]
    fn test_misaligned_languages_fail() {
        let catalog = normalize(vec![
            list(Keyword::Languages, &["sv", "en"]),
            list(Keyword::Stub, &["region", "kön"]),
            list(Keyword::Stub, &["region"]).with_language("en"),
        ])
        .unwrap();
        let err = resolve_variable_codes(&catalog).unwrap_err();
        assert!(matches!(err, PxError::InvalidScope { ref keyword, .. } if keyword == "STUB"));
    }
}
