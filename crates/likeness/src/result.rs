//! Result and error types for likeness.

use crate::decode::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for likeness operations
pub type LikenessResult<T> = Result<T, LikenessError>;

/// Which of the two compared inputs an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    /// The stored image (A)
    Reference,
    /// The freshly submitted image (B)
    Candidate,
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::Candidate => f.write_str("candidate"),
        }
    }
}

/// Errors that can occur in likeness
#[derive(Debug, Error)]
pub enum LikenessError {
    /// One of the inputs could not be decoded
    #[error("Failed to decode {slot} image: {source}")]
    Decode {
        /// Input that failed
        slot: ImageSlot,
        /// Underlying decoder error
        #[source]
        source: DecodeError,
    },

    /// Raw pixel buffer does not describe a valid raster
    #[error("Invalid raster: {message}")]
    InvalidRaster {
        /// Error message
        message: String,
    },

    /// Comparator configuration is out of range
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Encoding a raster (e.g. a diff image) failed
    #[error("Image encoding failed: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl LikenessError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid raster error
    #[must_use]
    pub fn invalid_raster(message: impl Into<String>) -> Self {
        Self::InvalidRaster {
            message: message.into(),
        }
    }

    /// Whether this error is an input-quality problem rather than a mismatch
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// The input that failed to decode, if any
    #[must_use]
    pub const fn slot(&self) -> Option<ImageSlot> {
        match self {
            Self::Decode { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}
