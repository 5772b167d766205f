//! Error types for Versekit.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, invalid chunker input, source
//! parsing, and document store failures.

use thiserror::Error;

/// Unified error type for Versekit.
///
/// All fallible functions return `Result<T, AppError>`.
/// Oversized verses and unresolved citations are not errors; they are
/// handled where they occur and only logged.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Precondition violated by the caller of the chunking engine
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed verse source data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Document store rejected a request; retrying will not help
    #[error("Store error: {0}")]
    Store(String),

    /// Transport or server-side failure that may succeed on retry
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the failed operation is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
