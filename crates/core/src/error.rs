//! Error types for the staffdesk engine.
//!
//! This module defines a unified error enum covering all error categories in
//! the application: configuration, I/O, record store, semantic index, and
//! generation-service errors.
//!
//! Missing data is not an error: a query that matches nothing produces an
//! empty-facts answer payload, never an `Err`. Generation failures are
//! absorbed by the response composer (template fallback). Only structurally
//! invalid calls and corrupt persisted artifacts surface as hard failures.

use thiserror::Error;

/// Unified error type for the staffdesk engine.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed call parameters (e.g., top-k of zero)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Persisted index artifacts are missing or inconsistent
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Record store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Semantic index errors
    #[error("Index error: {0}")]
    Index(String),

    /// Generation service errors (non-fatal for `answer`; the composer
    /// falls back to the templated narrative)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
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
