//! Configuration options for PX conversion.

use serde::{Deserialize, Serialize};

/// Line terminator used in written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }
}

/// Options controlling normalization, rendering and writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Physical lines are kept strictly shorter than this many characters.
    pub max_line_length: usize,

    /// Text written (quoted) for a cube cell with no observation.
    pub missing_marker: String,

    /// Encoding label used when the catalog declares no CODEPAGE.
    pub default_codepage: String,

    pub line_ending: LineEnding,

    /// Add VALUES, taken from the completion domain, for every language in
    /// which a classification variable declares none.
    pub synthesize_values: bool,

    /// Add LANGUAGE when several languages are declared and it is absent.
    pub synthesize_language: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_line_length: 256,
            missing_marker: "-".to_string(),
            default_codepage: "utf-8".to_string(),
            line_ending: LineEnding::Crlf,
            synthesize_values: true,
            synthesize_language: true,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    pub fn with_missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.missing_marker = marker.into();
        self
    }

    pub fn with_default_codepage(mut self, codepage: impl Into<String>) -> Self {
        self.default_codepage = codepage.into();
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Options that only keep what the catalog declares.
    pub fn without_synthesis(mut self) -> Self {
        self.synthesize_values = false;
        self.synthesize_language = false;
        self
    }
}
