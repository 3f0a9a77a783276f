//! likeness CLI library
//!
//! Thin file-based caller around the `likeness` comparison engine, split out
//! of `main.rs` so the handlers can be tested directly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, CompareArgs, ConfigArgs, FormatArg, InspectArgs, ModeArg,
};
pub use config::{load_comparator_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use handlers::{RunStatus, ERROR_EXIT_CODE};
pub use output::{render_verdict, CompareReport, InspectReport, OutputFormat, Reporter};

/// Build the CLI configuration from parsed arguments
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    let format = match &cli.command {
        Commands::Compare(args) => args.format.into(),
        Commands::Inspect(args) => args.format.into(),
        Commands::Config(_) => OutputFormat::Text,
    };

    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_format(format)
        .with_comparator_config(cli.config.clone())
}

/// Run the parsed command
///
/// # Errors
///
/// Returns the first error hit by the command handler
pub fn run(cli: &Cli) -> CliResult<RunStatus> {
    let config = build_config(cli);
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match &cli.command {
        Commands::Compare(args) => handlers::execute_compare(&config, &reporter, args),
        Commands::Inspect(args) => handlers::execute_inspect(&config, &reporter, args),
        Commands::Config(args) => handlers::execute_config(&config, &reporter, args),
    }
}
