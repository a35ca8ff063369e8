//! Error types for the Knowledge Base Assistant.
//!
//! This module defines a unified error enum that covers every failure the
//! backend can report: configuration, request preconditions, storage, the
//! completion provider and prompt rendering.

use thiserror::Error;

/// Unified error type for the Knowledge Base Assistant.
///
/// All fallible functions return `Result<T, AppError>`.
/// Errors are scoped to a single request; nothing here is process-fatal.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors, including a missing provider credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request precondition failures (empty question, empty id list, ...)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Article store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Completion provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error was raised before any external call was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Validation(_))
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
