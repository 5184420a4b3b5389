//! Error types for the diffview library
//!
//! Diff computation itself is total: any two finite sequences are valid
//! input, including empty ones. Errors only arise from configuration that
//! fails validation (reported before any matching work starts) and from the
//! I/O performed by callers that load text or configuration from disk.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the diffview library
pub type Result<T> = std::result::Result<T, DiffError>;

/// Main error type for all diffview operations
#[derive(Debug, Error)]
pub enum DiffError {
    /// Rejected option values (context size, indentation unit, heuristics)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O errors while reading inputs or configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors while parsing or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file is not valid UTF-8 text
    #[error("Input is not valid UTF-8: {path:?}")]
    Utf8 {
        /// Path of the offending input
        path: PathBuf,
        /// Underlying decoding error
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl DiffError {
    /// Create a configuration error with a custom message
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        DiffError::InvalidConfiguration(msg.into())
    }

    /// Check if this error was caused by bad options rather than bad input
    pub fn is_configuration(&self) -> bool {
        matches!(self, DiffError::InvalidConfiguration(_) | DiffError::Json(_))
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            DiffError::InvalidConfiguration(msg) => {
                format!(
                    "{}. Context size must be a non-negative number or 'unbounded', \
                     and the indentation unit must consist of whitespace only.",
                    msg
                )
            }
            DiffError::Utf8 { path, .. } => {
                format!("{:?} does not look like a text file. Binary diffs are not supported.", path)
            }
            _ => self.to_string(),
        }
    }
}
