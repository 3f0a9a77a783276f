//! likeness CLI: compare images from the command line
//!
//! ## Usage
//!
//! ```bash
//! likeness compare stored.png upload.png               # strict document match
//! likeness compare --mode relaxed id.jpg selfie.jpg    # coarse likeness
//! likeness compare a.png b.png --format json --diff-out diff.png
//! likeness inspect uploads/*.jpg
//! likeness config --default > likeness.yaml
//! ```

use clap::Parser;
use likeness_cli::{logging, run, Cli, Verbosity, ERROR_EXIT_CODE};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(Verbosity::from_flags(cli.quiet, cli.verbose));

    match run(&cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(ERROR_EXIT_CODE)
        }
    }
}
