//! Geographic to screen coordinate transforms for map overlays.
//!
//! Implements the map projections from scratch without external dependencies.

pub mod equirectangular;
pub mod error;
pub mod mercator;
pub mod viewport;

pub use equirectangular::Equirectangular;
pub use error::ProjectionError;
pub use mercator::WebMercator;
pub use viewport::{project, unproject, GeoPoint, ScreenPoint, Viewport, ViewportProjector};

/// Pixel size of one world tile at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Deepest zoom a viewport accepts.
pub const MAX_ZOOM: f64 = 30.0;

/// A world transform mapping lat/lon onto normalized world coordinates.
///
/// World coordinates `(u, v)` grow east and south; one world width is 1.0.
pub trait WorldProjection {
    /// Geographic degrees to normalized world coordinates.
    fn geo_to_world(&self, lat: f64, lon: f64) -> (f64, f64);

    /// Normalized world coordinates back to geographic degrees.
    fn world_to_geo(&self, u: f64, v: f64) -> (f64, f64);
}

/// Pixel width of the whole world at a (possibly fractional) zoom.
pub fn world_scale(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}
