//! Output formatting

use console::{style, Term};
use likeness::{ComparisonResult, MatchOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// JSON shape of a comparison
#[derive(Debug, Serialize)]
pub struct CompareReport<'a> {
    /// Reference image path
    pub reference: String,
    /// Candidate image path
    pub candidate: String,
    /// Comparison result
    #[serde(flatten)]
    pub result: &'a ComparisonResult,
}

/// JSON shape of an inspected image
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Image path
    pub path: String,
    /// Detected format
    pub format: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded size in bytes
    pub encoded_bytes: usize,
}

/// Writes verdicts to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a comparison verdict
    pub fn verdict(&self, reference: &Path, candidate: &Path, result: &ComparisonResult) {
        // Rejections are printed even in quiet mode.
        if result.matched && self.quiet {
            return;
        }
        let line = render_verdict(reference, candidate, result, self.use_color);
        let _ = self.term.write_line(&line);
    }

    /// Print a JSON document
    pub fn json(&self, value: &impl Serialize) -> serde_json::Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        let _ = self.term.write_line(&text);
        Ok(())
    }

    /// Print a command's primary text output, even in quiet mode
    pub fn output(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print a plain informational line
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(message);
    }

    /// Print a warning line
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("!").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

/// Render one verdict line
#[must_use]
pub fn render_verdict(
    reference: &Path,
    candidate: &Path,
    result: &ComparisonResult,
    use_color: bool,
) -> String {
    let label = match (result.matched, use_color) {
        (true, true) => style("MATCH").green().bold().to_string(),
        (false, true) => style("NO MATCH").red().bold().to_string(),
        (true, false) => "MATCH".to_string(),
        (false, false) => "NO MATCH".to_string(),
    };

    let detail = match result.outcome {
        MatchOutcome::DimensionMismatch {
            reference: (rw, rh),
            candidate: (cw, ch),
        } => format!("dimension mismatch: {rw}x{rh} vs {cw}x{ch}"),
        MatchOutcome::Matched | MatchOutcome::ToleranceExceeded => format!(
            "{}/{} pixels differ ({:.2}%)",
            result.differing_pixel_count,
            result.total_pixels_compared,
            result.differing_ratio() * 100.0
        ),
    };

    format!(
        "{label} {} ~ {} [{}] {detail}",
        reference.display(),
        candidate.display(),
        result.mode
    )
}
