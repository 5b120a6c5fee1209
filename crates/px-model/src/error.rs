//! Error taxonomy for PX table construction.
//!
//! Every variant is fatal for the current conversion. Variants name the
//! keyword, variable, language or code involved so the source spreadsheet
//! can be fixed.

use thiserror::Error;

/// Errors raised while normalizing metadata or building the data cube.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PxError {
    /// Raw input cannot be classified into any supported shape.
    #[error("unsupported input shape: {reason}")]
    InputShape { reason: String },

    /// A metadata row names a keyword that is not in the keyword table.
    #[error("unknown keyword '{keyword}'")]
    UnknownKeyword { keyword: String },

    /// An entry omits its language and no main language can be derived.
    #[error(
        "cannot determine language for {keyword}{}: no LANGUAGES entry",
        variable.as_deref().map(|v| format!("(\"{v}\")")).unwrap_or_default()
    )]
    AmbiguousLanguage {
        keyword: String,
        variable: Option<String>,
    },

    /// More than one variable is declared with type "time".
    #[error("more than one time variable declared: {}", variables.join(", "))]
    MultipleTimeVariables { variables: Vec<String> },

    /// Zero or several data columns are not tagged STUB or HEADING.
    #[error(
        "expected exactly one figures variable, found {}: [{}]",
        candidates.len(),
        candidates.join(", ")
    )]
    NoSingleFiguresVariable { candidates: Vec<String> },

    /// A data value has no entry in the variable's declared codelist.
    #[error("value '{code}' of variable '{variable}' is not in its codelist")]
    UnresolvableCode { variable: String, code: String },

    /// An entry's variable/cell qualifiers do not fit its keyword.
    #[error("invalid scope for {keyword}: {reason}")]
    InvalidScope { keyword: String, reason: String },

    /// A STUB or HEADING variable has no column in the data table.
    #[error("classification variable '{variable}' has no column in the data table")]
    MissingVariable { variable: String },

    /// Two data rows share the same combination of classification codes.
    #[error("duplicate observation for {key}")]
    DuplicateObservation { key: String },

    /// CODES and VALUES of a variable have different lengths.
    #[error("variable '{variable}' declares {codes} codes but {values} values")]
    CodelistMismatch {
        variable: String,
        codes: usize,
        values: usize,
    },
}

impl PxError {
    /// Create an InputShape error.
    pub fn input_shape(reason: impl Into<String>) -> Self {
        Self::InputShape {
            reason: reason.into(),
        }
    }

    /// Create an InvalidScope error.
    pub fn invalid_scope(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScope {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnresolvableCode error.
    pub fn unresolvable_code(variable: impl Into<String>, code: impl Into<String>) -> Self {
        Self::UnresolvableCode {
            variable: variable.into(),
            code: code.into(),
        }
    }
}

/// Result alias for model and core operations.
pub type Result<T> = std::result::Result<T, PxError>;
