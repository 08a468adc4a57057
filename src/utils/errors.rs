//! Error handling for SolrUndertow
//!
//! This module defines the top-level error type used by the launcher
//! and the severity classification used when reporting startup failures.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for SolrUndertow
#[derive(Error, Debug)]
pub enum SolrUndertowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration failed validation with {0} error(s)")]
    ValidationFailed(usize),
}

/// Result type alias for SolrUndertow operations
pub type Result<T> = std::result::Result<T, SolrUndertowError>;

impl SolrUndertowError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SolrUndertowError::Config(_) => ErrorSeverity::Critical,
            SolrUndertowError::ValidationFailed(_) => ErrorSeverity::Critical,
            SolrUndertowError::Logging(_) => ErrorSeverity::Warning,
            SolrUndertowError::InvalidArgument(_) => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
