//! Error types for satvis-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown request type: {0}")]
    UnknownCategory(String),

    #[error("invalid query parameter for {category}: {reason}")]
    InvalidParam { category: String, reason: String },

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
