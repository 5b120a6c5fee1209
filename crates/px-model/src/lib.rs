//! Data model for building PX statistical tables.
//!
//! Nothing here performs I/O. Normalization and cube construction live in
//! `px-core`; rendering lives in `px-output`.

pub mod codelist;
pub mod cube;
pub mod error;
pub mod keyword;
pub mod metadata;
pub mod options;
pub mod table;

pub use codelist::{ClassificationRole, Codelist, CodelistEntry};
pub use cube::{Axis, AxisCode, CartesianProduct, CubeCell, DataCube, COLUMN_NAME_SEPARATOR};
pub use error::{PxError, Result};
pub use keyword::{Keyword, KeywordScope, KeywordSpec, ValueStyle};
pub use metadata::{Catalog, MetadataEntry, RawMetadataEntry};
pub use options::{ConvertOptions, LineEnding};
pub use table::DataTable;
