//! CLI argument definitions for pxbuild.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use px_model::LineEnding;

use px_cli::config::OptionOverrides;

#[derive(Parser)]
#[command(
    name = "pxbuild",
    version,
    about = "Convert a spreadsheet and its metadata catalog into a PX file",
    long_about = "Convert a data table and a multi-language metadata catalog into a PX file.\n\n\
                  Inputs: a directory with metadata.csv and data.csv, a workbook with\n\
                  'metadata' and 'data' sheets, or a .pxsnap snapshot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Options file (default: pxbuild.toml in the platform config directory).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert an input into a PX file.
    Convert(ConvertArgs),

    /// Normalize an input and save it as a snapshot (.pxsnap) or JSON.
    Normalize(NormalizeArgs),

    /// List the supported keywords in file order.
    Keywords,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input directory, workbook or snapshot.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (default: <INPUT>.px).
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Convert and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Input directory, workbook or snapshot.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; `.json` writes JSON, anything else a binary snapshot.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,
}

/// Flags that override the options file.
#[derive(Args)]
pub struct OverrideArgs {
    /// Maximum physical line length.
    #[arg(long = "max-line-length", value_name = "CHARS")]
    pub max_line_length: Option<usize>,

    /// Text written for missing figures.
    #[arg(long = "missing-marker", value_name = "TEXT")]
    pub missing_marker: Option<String>,

    /// Encoding used when the metadata has no CODEPAGE.
    #[arg(long = "codepage", value_name = "LABEL")]
    pub codepage: Option<String>,

    /// Line terminator.
    #[arg(long = "line-ending", value_enum)]
    pub line_ending: Option<LineEndingArg>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> OptionOverrides {
        OptionOverrides {
            max_line_length: self.max_line_length,
            missing_marker: self.missing_marker.clone(),
            codepage: self.codepage.clone(),
            line_ending: self.line_ending.map(|arg| match arg {
                LineEndingArg::Crlf => LineEnding::Crlf,
                LineEndingArg::Lf => LineEnding::Lf,
            }),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LineEndingArg {
    Crlf,
    Lf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
