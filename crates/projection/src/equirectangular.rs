//! Plate carrée: latitude and longitude map linearly to world coordinates.

use crate::WorldProjection;

/// Equirectangular world transform. The world is twice as wide as it is tall,
/// so a degree covers the same number of pixels on both axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl WorldProjection for Equirectangular {
    fn geo_to_world(&self, lat: f64, lon: f64) -> (f64, f64) {
        ((lon + 180.0) / 360.0, (90.0 - lat) / 360.0)
    }

    fn world_to_geo(&self, u: f64, v: f64) -> (f64, f64) {
        (90.0 - v * 360.0, u * 360.0 - 180.0)
    }
}
