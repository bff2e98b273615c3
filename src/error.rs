//! Error types for schoolgate.

use thiserror::Error;

/// Common error type for schoolgate.
#[derive(Error, Debug)]
pub enum SchoolError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input or data files.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<crate::auth::PermissionError> for SchoolError {
    fn from(e: crate::auth::PermissionError) -> Self {
        SchoolError::Permission(e.to_string())
    }
}

/// Result type alias for schoolgate operations.
pub type Result<T> = std::result::Result<T, SchoolError>;
