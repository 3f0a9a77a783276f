//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// likeness: compare two images under a strict or relaxed pixel-difference policy
#[derive(Parser, Debug)]
#[command(name = "likeness")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Comparator configuration file (YAML)
    #[arg(long, env = "LIKENESS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a reference image with a candidate image
    ///
    /// Exits 0 when the images match, 1 when they do not, 2 on error.
    Compare(CompareArgs),

    /// Decode images and print their format and dimensions
    Inspect(InspectArgs),

    /// Show the effective comparator configuration
    Config(ConfigArgs),
}

/// Arguments for the compare command
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Stored reference image
    pub reference: PathBuf,

    /// Freshly submitted candidate image
    pub candidate: PathBuf,

    /// Comparison policy
    #[arg(short, long, default_value = "strict")]
    pub mode: ModeArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,

    /// Write a PNG highlighting differing pixels
    #[arg(long)]
    pub diff_out: Option<PathBuf>,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Images to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the config command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print the built-in defaults, ignoring any configuration file
    #[arg(long)]
    pub default: bool,
}

/// Comparison mode argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// Same-document re-upload: exact dimensions, 10% tolerance
    #[default]
    Strict,
    /// Live capture vs stored photo: 50x50 resample, 75% tolerance
    Relaxed,
}

impl From<ModeArg> for likeness::ComparisonMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => Self::Strict,
            ModeArg::Relaxed => Self::Relaxed,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_defaults() {
        let cli = Cli::try_parse_from(["likeness", "compare", "a.png", "b.jpg"]).unwrap();
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.reference, PathBuf::from("a.png"));
                assert_eq!(args.candidate, PathBuf::from("b.jpg"));
                assert_eq!(args.mode, ModeArg::Strict);
                assert_eq!(args.format, FormatArg::Text);
                assert!(args.diff_out.is_none());
            }
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_compare_relaxed_json() {
        let cli = Cli::try_parse_from([
            "likeness",
            "-vv",
            "compare",
            "--mode",
            "relaxed",
            "--format",
            "json",
            "--diff-out",
            "diff.png",
            "a.png",
            "b.png",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.mode, ModeArg::Relaxed);
        assert_eq!(args.format, FormatArg::Json);
        assert_eq!(args.diff_out, Some(PathBuf::from("diff.png")));
    }

    #[test]
    fn test_compare_requires_two_paths() {
        assert!(Cli::try_parse_from(["likeness", "compare", "a.png"]).is_err());
    }

    #[test]
    fn test_inspect_requires_a_file() {
        assert!(Cli::try_parse_from(["likeness", "inspect"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["likeness", "config", "--config", "likeness.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("likeness.yaml")));
    }

    #[test]
    fn test_mode_arg_conversion() {
        assert_eq!(
            likeness::ComparisonMode::from(ModeArg::Relaxed),
            likeness::ComparisonMode::Relaxed
        );
    }
}
