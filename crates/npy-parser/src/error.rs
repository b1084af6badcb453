//! Error types for grid file decoding.

use thiserror::Error;

/// Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a grid file cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before a required field
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    /// Magic string is not `\x93NUMPY`
    #[error("bad magic bytes, not an npy file")]
    BadMagic,

    /// Only format versions 1.x and 2.x are recognised
    #[error("unsupported npy format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Header bytes are not valid text
    #[error("header is not valid UTF-8")]
    HeaderEncoding,

    /// Header text does not follow the dict grammar
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A required header key is absent
    #[error("missing header key '{0}'")]
    MissingKey(&'static str),

    #[error("unsupported dtype '{0}', expected little-endian float32 ('<f4')")]
    UnsupportedDtype(String),

    #[error("invalid shape {0:?}, expected two positive dimensions")]
    InvalidShape(Vec<usize>),

    /// Payload size does not match the declared shape
    #[error("payload has {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
}
