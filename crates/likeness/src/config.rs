//! Comparator configuration.

use crate::decode::DecodeLimits;
use crate::policy::{ComparisonMode, ComparisonPolicy};
use crate::result::{LikenessError, LikenessResult};
use serde::{Deserialize, Serialize};

/// Policies per mode plus decoder limits
///
/// Every field has a default, so a partial YAML document only overrides the
/// keys it names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    /// Policy applied in [`ComparisonMode::Strict`]
    pub strict: ComparisonPolicy,
    /// Policy applied in [`ComparisonMode::Relaxed`]
    pub relaxed: ComparisonPolicy,
    /// Decoder resource limits
    pub limits: DecodeLimits,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            strict: ComparisonPolicy::STRICT,
            relaxed: ComparisonPolicy::RELAXED,
            limits: DecodeLimits::default(),
        }
    }
}

impl ComparatorConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Yaml`] for malformed YAML and
    /// [`LikenessError::Config`] for out-of-range values.
    pub fn from_yaml_str(yaml: &str) -> LikenessResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Yaml`] if serialization fails
    pub fn to_yaml(&self) -> LikenessResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Replace the strict policy
    #[must_use]
    pub const fn with_strict(mut self, policy: ComparisonPolicy) -> Self {
        self.strict = policy;
        self
    }

    /// Replace the relaxed policy
    #[must_use]
    pub const fn with_relaxed(mut self, policy: ComparisonPolicy) -> Self {
        self.relaxed = policy;
        self
    }

    /// Replace the decode limits
    #[must_use]
    pub const fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Policy for `mode`
    #[must_use]
    pub const fn policy(&self, mode: ComparisonMode) -> &ComparisonPolicy {
        match mode {
            ComparisonMode::Strict => &self.strict,
            ComparisonMode::Relaxed => &self.relaxed,
        }
    }

    /// Validate every policy and limit
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Config`] prefixed with the offending section.
    pub fn validate(&self) -> LikenessResult<()> {
        for mode in [ComparisonMode::Strict, ComparisonMode::Relaxed] {
            self.policy(mode).validate_for(mode).map_err(|e| match e {
                LikenessError::Config { message } => {
                    LikenessError::config(format!("{mode}: {message}"))
                }
                other => other,
            })?;
        }
        if self.limits.max_width == 0 || self.limits.max_height == 0 {
            return Err(LikenessError::config("limits: max dimensions must be positive"));
        }
        Ok(())
    }
}
