//! Config command handler

use super::RunStatus;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Reporter;
use crate::ConfigArgs;
use likeness::ComparatorConfig;

/// Effective comparator configuration rendered as YAML
///
/// # Errors
///
/// Returns an error if the configuration file is unreadable or invalid
pub fn render_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<String> {
    let comparator = if args.default {
        ComparatorConfig::default()
    } else {
        config.load_comparator_config()?
    };
    Ok(comparator.to_yaml()?)
}

/// Execute the config command
///
/// # Errors
///
/// See [`render_config`]
pub fn execute_config(
    config: &CliConfig,
    reporter: &Reporter,
    args: &ConfigArgs,
) -> CliResult<RunStatus> {
    let yaml = render_config(config, args)?;
    reporter.output(yaml.trim_end());
    Ok(RunStatus::Success)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_defaults() {
        let yaml = render_config(&CliConfig::new(), &ConfigArgs { default: false }).unwrap();
        assert!(yaml.contains("strict:"));
        assert!(yaml.contains("tolerance: 0.75"));
    }

    #[test]
    fn test_default_flag_ignores_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("likeness.yaml");
        std::fs::write(&path, "not: [valid").unwrap();
        let config = CliConfig::new().with_comparator_config(Some(path));

        assert!(render_config(&config, &ConfigArgs { default: false }).is_err());
        let yaml = render_config(&config, &ConfigArgs { default: true }).unwrap();
        assert!(yaml.contains("relaxed:"));
    }
}
