//! Error types for Duet core

use thiserror::Error;

/// Main error type for Duet operations
#[derive(Debug, Error)]
pub enum DuetError {
    /// Demo fixture missing, unreadable or malformed
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Upload storage error
    #[error("Upload error: {0}")]
    Upload(String),
}

/// Convenient Result type using DuetError
pub type Result<T> = std::result::Result<T, DuetError>;

impl DuetError {
    /// Create a fixture error
    pub fn fixture(msg: impl Into<String>) -> Self {
        DuetError::Fixture(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        DuetError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DuetError::Validation(msg.into())
    }

    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        DuetError::Template(msg.into())
    }

    /// Create an upload error
    pub fn upload(msg: impl Into<String>) -> Self {
        DuetError::Upload(msg.into())
    }

    /// Whether the error means the demo conversation cannot be shown
    pub fn is_fixture(&self) -> bool {
        matches!(self, DuetError::Fixture(_))
    }
}
