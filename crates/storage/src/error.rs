//! Loader error types.
//!
//! Both enums are `Clone` so one failed in-flight load can be handed to every
//! caller waiting on it.

use aq_common::AqError;
use npy_parser::DecodeError;
use thiserror::Error;

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Failure to retrieve the raw bytes of a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{path}: server returned status {status}")]
    Status { path: String, status: u16 },

    #[error("{path}: request timed out")]
    Timeout { path: String },

    #[error("{path}: transport error: {message}")]
    Transport { path: String, message: String },

    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },
}

impl FetchError {
    /// Path or URL the failed request was for.
    pub fn path(&self) -> &str {
        match self {
            FetchError::Status { path, .. }
            | FetchError::Timeout { path }
            | FetchError::Transport { path, .. }
            | FetchError::Io { path, .. } => path,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// Requested forecast hour is not listed in the manifest
    #[error("forecast hour {0} is not in the manifest")]
    HourNotFound(u32),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to decode {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },

    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] AqError),

    /// Decoded array does not have the shape the manifest declares
    #[error("{file} has shape {actual:?}, manifest declares {expected:?}")]
    ShapeMismatch {
        file: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}
