//! Inspect command handler

use super::{read_image, RunStatus};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{InspectReport, OutputFormat, Reporter};
use crate::InspectArgs;
use likeness::decode::{format_name, sniff_format};
use likeness::{Decoder, FormatHint};
use std::path::Path;

/// Decode one file and describe it
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn inspect_file(decoder: &Decoder, path: &Path) -> CliResult<InspectReport> {
    let bytes = read_image(path)?;
    let hint = FormatHint::from_path(path);
    let to_error = |source| CliError::decode(path, source);

    let format = sniff_format(&bytes, hint).map_err(to_error)?;
    let image = decoder.decode(&bytes, hint).map_err(to_error)?;

    Ok(InspectReport {
        path: path.display().to_string(),
        format: format_name(format),
        width: image.width(),
        height: image.height(),
        encoded_bytes: bytes.len(),
    })
}

/// Execute the inspect command
///
/// # Errors
///
/// Stops at the first file that cannot be read or decoded
pub fn execute_inspect(
    config: &CliConfig,
    reporter: &Reporter,
    args: &InspectArgs,
) -> CliResult<RunStatus> {
    let decoder = Decoder::new(config.load_comparator_config()?.limits);

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let report = inspect_file(&decoder, path)?;
        if config.format == OutputFormat::Text {
            reporter.info(&format!(
                "{}: {} {}x{} ({} bytes)",
                report.path, report.format, report.width, report.height, report.encoded_bytes
            ));
        }
        reports.push(report);
    }

    if config.format == OutputFormat::Json {
        reporter.json(&reports)?;
    }
    Ok(RunStatus::Success)
}
