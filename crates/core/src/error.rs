//! Error types for the subtok library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum BpeError {
    /// Persisted rule data could not be parsed into well-formed entries
    #[error("Malformed rule data: {0}")]
    MalformedRuleData(String),

    /// Backing storage for a rule set could not be read or written
    #[error("I/O unavailable for {path}: {source}")]
    IoUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BpeError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from malformed persisted data.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRuleData(_))
    }
}

/// Result type alias for subtok operations.
pub type Result<T> = std::result::Result<T, BpeError>;
