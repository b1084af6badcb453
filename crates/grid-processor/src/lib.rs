//! Point sampling of forecast grids.
//!
//! ```text
//! OzoneService::get_ozone_value(lat, lon, hour)
//!      │
//!      ├─► manifest bounds check (no grid fetch when outside)
//!      │
//!      ├─► GridCache::load_grid(hour)
//!      │
//!      └─► sample(grid, lat, lon) ─► bilinear_interpolate(row/col fractions)
//! ```

pub mod sampler;
pub mod service;

pub use sampler::{bilinear_interpolate, fractional_index, sample, Sample};
pub use service::{OzoneService, PointValue};
