//! Projection errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}
