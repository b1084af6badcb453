//! Common types shared across the air-quality overlay crates.

pub mod aqi;
pub mod bounds;
pub mod error;
pub mod grid;
pub mod manifest;
pub mod station;

pub use aqi::{AqiBand, AqiCategory};
pub use bounds::GeoBounds;
pub use error::{AqError, AqResult};
pub use grid::{Grid, GridMeta};
pub use manifest::{GridManifest, ManifestHour, RawManifest};
pub use station::StationPoint;
