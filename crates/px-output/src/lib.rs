//! Rendering and writing of PX files.

pub mod error;
pub mod render;
pub mod writer;

pub use error::{OutputError, Result};
pub use render::{
    DATA_KEYWORD, MIN_LINE_LENGTH, is_numeric_figure, keyword_token, render_lines,
    render_to_string,
};
pub use writer::{WriteReport, encode, resolve_encoding, write_atomic, write_px_file};
