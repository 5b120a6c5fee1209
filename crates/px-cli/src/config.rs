//! Conversion options from a TOML file and command-line overrides.
//!
//! Lookup order: `--config <FILE>` (read and parse errors are fatal), else
//! `pxbuild.toml` in the platform config directory when it exists, else
//! defaults. Flags given on the command line win over the file.
//!
//! ```toml
//! max_line_length = 256
//! missing_marker = ".."
//! default_codepage = "iso-8859-1"
//! line_ending = "lf"
//! synthesize_values = true
//! synthesize_language = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use px_model::{ConvertOptions, LineEnding};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "pxbuild";
const APP_NAME: &str = "pxbuild";
pub const CONFIG_FILENAME: &str = "pxbuild.toml";

/// Path of the platform config file, if a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Parse options from TOML text. Missing fields keep their defaults.
pub fn parse_options(text: &str) -> Result<ConvertOptions> {
    Ok(toml::from_str(text)?)
}

/// Load options from an explicit file or the platform config file.
pub fn load_options(explicit: Option<&Path>) -> Result<ConvertOptions> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let options =
            parse_options(&text).with_context(|| format!("parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded config");
        return Ok(options);
    }

    let Some(path) = default_config_path() else {
        tracing::debug!("No platform config directory, using default options");
        return Ok(ConvertOptions::default());
    };
    match fs::read_to_string(&path) {
        Ok(text) => match parse_options(&text) {
            Ok(options) => {
                tracing::info!(path = %path.display(), "Loaded config");
                Ok(options)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unparsable config");
                Ok(ConvertOptions::default())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConvertOptions::default()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
            Ok(ConvertOptions::default())
        }
    }
}

/// Command-line values that replace file options when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub max_line_length: Option<usize>,
    pub missing_marker: Option<String>,
    pub codepage: Option<String>,
    pub line_ending: Option<LineEnding>,
}

impl OptionOverrides {
    pub fn apply(self, mut options: ConvertOptions) -> ConvertOptions {
        if let Some(length) = self.max_line_length {
            options.max_line_length = length;
        }
        if let Some(marker) = self.missing_marker {
            options.missing_marker = marker;
        }
        if let Some(codepage) = self.codepage {
            options.default_codepage = codepage;
        }
        if let Some(line_ending) = self.line_ending {
            options.line_ending = line_ending;
        }
        options
    }
}
