//! Conversion core: metadata catalog, codelist resolver and data cube builder.

pub mod catalog;
pub mod codelist;
pub mod context;
pub mod cube;
pub mod pipeline;
pub mod timeval;
pub mod variables;

pub use catalog::{compare_entries, normalize, sort};
pub use codelist::{TIME_VARIABLE_TYPE, resolve_codelist, resolve_time_variable};
pub use context::{ColumnBinding, ConversionContext};
pub use cube::{Codelists, build_data_cube, completion_domain};
pub use pipeline::{
    Conversion, ConversionSummary, RECOMMENDED_KEYWORDS, convert, convert_catalog,
};
pub use timeval::{TimeGranularity, classify, infer_granularity, timeval_value};
pub use variables::{ClassificationVariable, VariableSet, resolve_variable_codes};
