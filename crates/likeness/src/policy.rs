//! Comparison modes and their thresholds.

use crate::result::{LikenessError, LikenessResult};
use crate::score::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which comparison policy to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Same-document re-upload: exact dimensions, fine threshold, 10% tolerance
    #[default]
    Strict,
    /// Live capture vs stored photo: 50x50 resample, coarse threshold, 75% tolerance
    Relaxed,
}

impl ComparisonMode {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = LikenessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "relaxed" => Ok(Self::Relaxed),
            other => Err(LikenessError::config(format!(
                "unknown comparison mode '{other}' (expected strict or relaxed)"
            ))),
        }
    }
}

/// Fixed resolution both images are resampled to before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSize {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
}

impl CanonicalSize {
    /// Create a canonical size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square canonical size
    #[must_use]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

impl Default for CanonicalSize {
    fn default() -> Self {
        Self::square(50)
    }
}

/// Thresholds and resampling behavior of one comparison mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPolicy {
    /// Canonical resample size; must be set for relaxed and unset for strict
    pub resample_to: Option<CanonicalSize>,
    /// Per-pixel distance cutoff in `[0, 1]`
    pub pixel_threshold: f64,
    /// Accept when fewer than `total * tolerance` pixels differ, in `(0, 1]`
    pub tolerance: f64,
    /// Per-pixel distance metric
    #[serde(default)]
    pub metric: DistanceMetric,
}

impl ComparisonPolicy {
    /// Document re-upload policy
    pub const STRICT: Self = Self {
        resample_to: None,
        pixel_threshold: 0.10,
        tolerance: 0.10,
        metric: DistanceMetric::Euclidean,
    };

    /// Coarse face-likeness policy
    pub const RELAXED: Self = Self {
        resample_to: Some(CanonicalSize::square(50)),
        pixel_threshold: 0.25,
        tolerance: 0.75,
        metric: DistanceMetric::Euclidean,
    };

    /// Built-in policy for `mode`
    #[must_use]
    pub const fn for_mode(mode: ComparisonMode) -> Self {
        match mode {
            ComparisonMode::Strict => Self::STRICT,
            ComparisonMode::Relaxed => Self::RELAXED,
        }
    }

    /// Set the per-pixel threshold
    #[must_use]
    pub const fn with_pixel_threshold(mut self, threshold: f64) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    /// Set the differing-pixel tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the distance metric
    #[must_use]
    pub const fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set (or clear) the canonical resample size
    #[must_use]
    pub const fn with_resample_to(mut self, size: Option<CanonicalSize>) -> Self {
        self.resample_to = size;
        self
    }

    /// Whether `differing` out of `total` pixels is within tolerance
    #[must_use]
    pub fn accepts(&self, differing: usize, total: usize) -> bool {
        (differing as f64) < (total as f64) * self.tolerance
    }

    /// Check that every field is in range
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Config`] naming the offending field.
    pub fn validate(&self) -> LikenessResult<()> {
        if !(0.0..=1.0).contains(&self.pixel_threshold) {
            return Err(LikenessError::config(format!(
                "pixel_threshold must be within [0, 1], got {}",
                self.pixel_threshold
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance <= 1.0) {
            return Err(LikenessError::config(format!(
                "tolerance must be within (0, 1], got {}",
                self.tolerance
            )));
        }
        if let Some(size) = self.resample_to {
            if size.width == 0 || size.height == 0 {
                return Err(LikenessError::config(format!(
                    "resample_to must be positive, got {}x{}",
                    size.width, size.height
                )));
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the per-mode resample rule: strict
    /// never resamples and relaxed always does
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Config`] naming the offending field.
    pub fn validate_for(&self, mode: ComparisonMode) -> LikenessResult<()> {
        self.validate()?;
        match (mode, self.resample_to) {
            (ComparisonMode::Strict, Some(size)) => Err(LikenessError::config(format!(
                "resample_to must be null in strict mode, got {}x{}",
                size.width, size.height
            ))),
            (ComparisonMode::Relaxed, None) => Err(LikenessError::config(
                "resample_to is required in relaxed mode",
            )),
            _ => Ok(()),
        }
    }
}
