//! Renderer error types.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Pixel buffer length does not match the declared dimensions
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
