//! Spherical Web Mercator (EPSG:3857), the projection of slippy-map tiles.

use std::f64::consts::PI;

use crate::WorldProjection;

/// Latitude limit where the Mercator world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Web Mercator world transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WorldProjection for WebMercator {
    fn geo_to_world(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin = lat.to_radians().sin();
        let u = (lon + 180.0) / 360.0;
        let v = 0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI);
        (u, v)
    }

    fn world_to_geo(&self, u: f64, v: f64) -> (f64, f64) {
        let lon = u * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * v)).sinh().atan().to_degrees();
        (lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_world_center() {
        let (u, v) = WebMercator.geo_to_world(0.0, 0.0);
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_max_latitude_is_world_top() {
        let (_, v) = WebMercator.geo_to_world(MAX_LATITUDE, 0.0);
        assert!(v.abs() < 1e-9);
        // beyond the limit clamps instead of diverging
        let (_, v_pole) = WebMercator.geo_to_world(90.0, 0.0);
        assert!(v_pole.is_finite());
        assert!((v_pole - v).abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        for &(lat, lon) in &[(38.0, -95.0), (-33.9, 151.2), (64.1, -21.9), (0.0, 179.9)] {
            let (u, v) = WebMercator.geo_to_world(lat, lon);
            let (lat2, lon2) = WebMercator.world_to_geo(u, v);
            assert!((lat - lat2).abs() < 1e-9, "lat {} -> {}", lat, lat2);
            assert!((lon - lon2).abs() < 1e-9, "lon {} -> {}", lon, lon2);
        }
    }
}
