//! Geographic bounds of a gridded dataset.

use serde::{Deserialize, Serialize};

use crate::error::{AqError, AqResult};

/// A lat/lon rectangle in WGS84 degrees.
///
/// Always ordered: `lat_min < lat_max` and `lon_min < lon_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    /// Create validated bounds.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> AqResult<Self> {
        let all_finite = [lat_min, lat_max, lon_min, lon_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(AqError::InvalidBounds(format!(
                "non-finite coordinate in [{}, {}] x [{}, {}]",
                lat_min, lat_max, lon_min, lon_max
            )));
        }
        if lat_min >= lat_max {
            return Err(AqError::InvalidBounds(format!(
                "lat_min {} must be below lat_max {}",
                lat_min, lat_max
            )));
        }
        if lon_min >= lon_max {
            return Err(AqError::InvalidBounds(format!(
                "lon_min {} must be below lon_max {}",
                lon_min, lon_max
            )));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Check if a point lies inside the bounds (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Check if two bounds overlap.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.lat_min <= other.lat_max
            && self.lat_max >= other.lat_min
            && self.lon_min <= other.lon_max
            && self.lon_max >= other.lon_min
    }
}
