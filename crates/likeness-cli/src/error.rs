//! Error types for the CLI

use std::path::Path;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error on a named file
    #[error("I/O error on {path}: {source}")]
    File {
        /// File involved
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be decoded as an image
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// File involved
        path: String,
        /// Underlying decoder error
        #[source]
        source: likeness::DecodeError,
    },

    /// Library error
    #[error("{0}")]
    Likeness(#[from] likeness::LikenessError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error for `path`
    #[must_use]
    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a decode error for `path`
    #[must_use]
    pub fn decode(path: &Path, source: likeness::DecodeError) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            source,
        }
    }
}
