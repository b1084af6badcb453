//! Loading of the forecast manifest and per-hour grid files.
//!
//! - [`GridFetcher`] abstracts where bytes come from (HTTP or a local directory)
//! - [`GridCache`] memoizes the manifest and decoded grids, sharing in-flight loads

pub mod config;
pub mod error;
pub mod fetch;
pub mod grid_cache;

pub use config::LoaderConfig;
pub use error::{FetchError, LoaderError, LoaderResult};
pub use fetch::{FileFetcher, GridFetcher, HttpFetcher};
pub use grid_cache::{CacheStats, GridCache};
