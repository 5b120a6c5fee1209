//! Conversion context.
//!
//! Values every stage must agree on (main language, classification
//! variables and the data columns they map to, figures variable, time
//! variable, options) are derived once here and passed explicitly.

use px_model::{Catalog, ClassificationRole, ConvertOptions, DataTable, PxError, Result};

use crate::codelist::resolve_time_variable;
use crate::variables::{ClassificationVariable, VariableSet, resolve_variable_codes};

/// Data-table column assigned to one classification variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub variable: String,
    pub column: usize,
}

/// Immutable per-conversion facts.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    pub main_language: String,
    pub language_order: Vec<String>,
    pub variables: VariableSet,
    /// STUB variables in order, with their data columns.
    pub stub: Vec<ColumnBinding>,
    /// HEADING variables in order, with their data columns.
    pub heading: Vec<ColumnBinding>,
    /// Name of the figures column.
    pub figures_variable: String,
    pub figures_column: usize,
    /// Code of the time variable, if one is declared.
    pub time_variable: Option<String>,
    pub options: ConvertOptions,
}

impl ConversionContext {
    /// Derive the context from a normalized catalog and the data headers.
    pub fn build(catalog: &Catalog, data: &DataTable, options: &ConvertOptions) -> Result<Self> {
        let variables = resolve_variable_codes(catalog)?;
        let time_variable =
            resolve_time_variable(catalog, &variables)?.map(|variable| variable.code.clone());

        let stub = bind_columns(&variables, ClassificationRole::Stub, catalog, data)?;
        let heading = bind_columns(&variables, ClassificationRole::Heading, catalog, data)?;

        let candidates: Vec<(usize, &String)> = data
            .headers
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                !stub
                    .iter()
                    .chain(&heading)
                    .any(|binding| binding.column == *index)
            })
            .collect();
        let (figures_column, figures_variable) = match candidates.as_slice() {
            [(column, name)] => (*column, name.trim().to_string()),
            _ => {
                return Err(PxError::NoSingleFiguresVariable {
                    candidates: candidates
                        .iter()
                        .map(|(_, name)| name.trim().to_string())
                        .collect(),
                });
            }
        };
        tracing::debug!(
            main = %catalog.main_language,
            figures = %figures_variable,
            stub = stub.len(),
            heading = heading.len(),
            "Built conversion context"
        );

        Ok(Self {
            main_language: catalog.main_language.clone(),
            language_order: catalog.language_order.clone(),
            variables,
            stub,
            heading,
            figures_variable,
            figures_column,
            time_variable,
            options: options.clone(),
        })
    }

    pub fn variable(&self, code: &str) -> Option<&ClassificationVariable> {
        self.variables.get(code)
    }
}

fn bind_columns(
    variables: &VariableSet,
    role: ClassificationRole,
    catalog: &Catalog,
    data: &DataTable,
) -> Result<Vec<ColumnBinding>> {
    variables
        .with_role(role)
        .map(|variable| {
            let main_label = variable.label(&catalog.main_language).unwrap_or(&variable.code);
            data.column_index(&variable.code)
                .or_else(|| data.column_index(main_label))
                .map(|column| ColumnBinding {
                    variable: variable.code.clone(),
                    column,
                })
                .ok_or_else(|| PxError::MissingVariable {
                    variable: variable.code.clone(),
                })
        })
        .collect()
}
