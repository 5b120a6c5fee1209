use std::path::Path;

use anyhow::{Result, bail};
use tracing::info_span;

use px_cli::config::load_options;
use px_cli::pipeline::{
    NormalizedFormat, default_output_path, load_and_convert, write_normalized, write_px,
};
use px_core::ConversionSummary;
use px_output::WriteReport;

use crate::cli::{ConvertArgs, NormalizeArgs};
use crate::summary::print_keyword_table;

pub struct ConvertOutcome {
    pub summary: ConversionSummary,
    pub report: Option<WriteReport>,
}

pub fn run_convert(args: &ConvertArgs, config: Option<&Path>) -> Result<ConvertOutcome> {
    let span = info_span!("convert_command", input = %args.input.display());
    let _guard = span.enter();

    let options = args.overrides.to_overrides().apply(load_options(config)?);
    let loaded = load_and_convert(&args.input, &options)?;
    let summary = loaded.conversion.summary();
    if args.dry_run {
        return Ok(ConvertOutcome {
            summary,
            report: None,
        });
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let report = write_px(&loaded, &output, &options)?;
    Ok(ConvertOutcome {
        summary,
        report: Some(report),
    })
}

pub fn run_normalize(args: &NormalizeArgs, config: Option<&Path>) -> Result<()> {
    let span = info_span!("normalize_command", input = %args.input.display());
    let _guard = span.enter();

    if args.output == args.input {
        bail!("output {} would overwrite the input", args.output.display());
    }
    let options = load_options(config)?;
    let loaded = load_and_convert(&args.input, &options)?;
    let format = write_normalized(&loaded, &args.output)?;
    let label = match format {
        NormalizedFormat::Snapshot => "snapshot",
        NormalizedFormat::Json => "JSON",
    };
    println!(
        "Wrote {label} {} ({} entries)",
        args.output.display(),
        loaded.conversion.catalog.len()
    );
    Ok(())
}

pub fn run_keywords() -> Result<()> {
    print_keyword_table();
    Ok(())
}
