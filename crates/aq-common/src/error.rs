//! Error types for shared domain validation.

use thiserror::Error;

/// Result type alias using AqError.
pub type AqResult<T> = Result<T, AqError>;

/// Validation errors raised while building domain types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AqError {
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid grid shape: {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },

    #[error("Grid has {actual} values, expected {expected}")]
    ValueCount { expected: usize, actual: usize },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

impl From<serde_json::Error> for AqError {
    fn from(err: serde_json::Error) -> Self {
        AqError::InvalidManifest(format!("JSON error: {}", err))
    }
}
