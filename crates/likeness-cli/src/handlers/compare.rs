//! Compare command handler

use super::RunStatus;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{CompareReport, OutputFormat, Reporter};
use crate::CompareArgs;
use likeness::{ComparisonMode, FormatHint, ImageComparator, RasterImage};
use std::path::Path;

/// Read an image file into memory
///
/// # Errors
///
/// Returns [`CliError::File`] naming the path
pub fn read_image(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| CliError::file(path, e))
}

/// Execute the compare command
///
/// # Errors
///
/// Returns an error if a file cannot be read or decoded, or the
/// configuration is invalid. A mismatch is not an error.
pub fn execute_compare(
    config: &CliConfig,
    reporter: &Reporter,
    args: &CompareArgs,
) -> CliResult<RunStatus> {
    let comparator = ImageComparator::new(config.load_comparator_config()?)?;
    let mode = ComparisonMode::from(args.mode);

    let reference = read_image(&args.reference)?;
    let candidate = read_image(&args.candidate)?;
    tracing::info!(
        reference = %args.reference.display(),
        candidate = %args.candidate.display(),
        %mode,
        "comparing images"
    );

    let reference_input = (reference.as_slice(), FormatHint::from_path(&args.reference));
    let candidate_input = (candidate.as_slice(), FormatHint::from_path(&args.candidate));
    let result = match args.diff_out {
        Some(ref diff_path) => {
            let (result, mask) =
                comparator.compare_with_diff(reference_input, candidate_input, mode)?;
            write_diff(reporter, mask, diff_path)?;
            result
        }
        None => comparator.compare_with_hints(reference_input, candidate_input, mode)?,
    };

    match config.format {
        OutputFormat::Json => reporter.json(&CompareReport {
            reference: args.reference.display().to_string(),
            candidate: args.candidate.display().to_string(),
            result: &result,
        })?,
        OutputFormat::Text => reporter.verdict(&args.reference, &args.candidate, &result),
    }

    Ok(if result.matched {
        RunStatus::Success
    } else {
        RunStatus::NotMatched
    })
}

fn write_diff(reporter: &Reporter, mask: Option<RasterImage>, path: &Path) -> CliResult<()> {
    match mask {
        Some(mask) => {
            std::fs::write(path, mask.to_png()?).map_err(|e| CliError::file(path, e))?;
            tracing::info!(path = %path.display(), "wrote diff image");
        }
        None => reporter.warning("dimensions differ; no diff image written"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{FormatArg, ModeArg};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, RasterImage::solid(width, height, rgba).to_png().unwrap()).unwrap();
        path
    }

    fn args(reference: PathBuf, candidate: PathBuf, mode: ModeArg) -> CompareArgs {
        CompareArgs {
            reference,
            candidate,
            mode,
            format: FormatArg::Text,
            diff_out: None,
        }
    }

    fn quiet() -> Reporter {
        Reporter::new(false, true)
    }

    #[test]
    fn test_matching_images_succeed() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 20, 20, [255, 0, 0, 255]);
        let status =
            execute_compare(&CliConfig::new(), &quiet(), &args(a.clone(), a, ModeArg::Strict))
                .unwrap();
        assert_eq!(status, RunStatus::Success);
    }

    #[test]
    fn test_mismatch_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 20, 20, [0, 0, 0, 255]);
        let b = write_png(&dir, "b.png", 20, 30, [0, 0, 0, 255]);
        let status =
            execute_compare(&CliConfig::new(), &quiet(), &args(a, b, ModeArg::Strict)).unwrap();
        assert_eq!(status, RunStatus::NotMatched);
        assert_eq!(status.exit_code(), 1);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 4, 4, [0, 0, 0, 255]);
        let missing = dir.path().join("missing.png");
        let err = execute_compare(&CliConfig::new(), &quiet(), &args(a, missing, ModeArg::Strict))
            .unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_undecodable_file_is_error() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 4, 4, [0, 0, 0, 255]);
        let bad = dir.path().join("bad.jpg");
        std::fs::write(&bad, b"not really a jpeg").unwrap();
        let err = execute_compare(&CliConfig::new(), &quiet(), &args(a, bad, ModeArg::Relaxed))
            .unwrap_err();
        assert!(matches!(err, CliError::Likeness(ref e) if e.is_decode()));
    }

    #[test]
    fn test_diff_out_decodes_with_extension_hints() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 8, 8, [0, 0, 0, 255]);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"\x00\x01\x02\x03").unwrap();
        let diff = dir.path().join("diff.png");
        let mut compare_args = args(a, bad, ModeArg::Strict);
        compare_args.diff_out = Some(diff.clone());

        let err = execute_compare(&CliConfig::new(), &quiet(), &compare_args).unwrap_err();
        assert!(err.to_string().contains("malformed png"), "{err}");
        assert!(!diff.exists());
    }

    #[test]
    fn test_diff_out_written() {
        let dir = TempDir::new().unwrap();
        let a = write_png(&dir, "a.png", 30, 30, [0, 0, 0, 255]);
        let b = write_png(&dir, "b.png", 60, 40, [255, 255, 255, 255]);
        let diff = dir.path().join("diff.png");
        let mut compare_args = args(a, b, ModeArg::Relaxed);
        compare_args.diff_out = Some(diff.clone());

        let status = execute_compare(&CliConfig::new(), &quiet(), &compare_args).unwrap();
        assert_eq!(status, RunStatus::NotMatched);

        let mask = likeness::decode(&std::fs::read(&diff).unwrap()).unwrap();
        assert_eq!(mask.dimensions(), (50, 50));
    }
}
