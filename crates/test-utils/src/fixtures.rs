//! Common fixtures: bounds, manifests, grids and stations.

use aq_common::{GeoBounds, Grid, GridMeta, StationPoint};

use crate::generators::EXAMPLE_4X4;

/// Common bounds as `(lat_min, lat_max, lon_min, lon_max)`.
pub mod bounds {
    /// Bounds of the 4x4 worked example
    pub const EXAMPLE: (f64, f64, f64, f64) = (-60.0, 60.0, -130.0, -30.0);

    /// Continental United States, as published by the ozone pack
    pub const CONUS: (f64, f64, f64, f64) = (24.0, 50.0, -125.0, -66.0);
}

pub fn example_bounds() -> GeoBounds {
    let (lat_min, lat_max, lon_min, lon_max) = bounds::EXAMPLE;
    GeoBounds {
        lat_min,
        lat_max,
        lon_min,
        lon_max,
    }
}

/// The 4x4 worked example grid.
pub fn example_grid() -> Grid {
    grid_from(4, 4, example_bounds(), EXAMPLE_4X4.to_vec())
}

/// Build a grid from parts, panicking on inconsistent fixtures.
pub fn grid_from(rows: usize, cols: usize, bounds: GeoBounds, values: Vec<f32>) -> Grid {
    let meta = GridMeta::new(rows, cols, bounds).expect("fixture grid meta");
    Grid::new(meta, values).expect("fixture grid values")
}

/// File name the fixtures use for a forecast hour.
pub fn hour_file(index: u32) -> String {
    format!("ozone_h{:02}.npy", index)
}

/// Manifest JSON listing `hours` consecutive hours from 2025-10-04T00:00Z.
pub fn manifest_json(rows: usize, cols: usize, bounds: (f64, f64, f64, f64), hours: u32) -> String {
    let (lat_min, lat_max, lon_min, lon_max) = bounds;
    let hours: Vec<serde_json::Value> = (0..hours)
        .map(|i| {
            serde_json::json!({
                "index": i,
                "file": hour_file(i),
                "timestamp": format!("2025-10-04T{:02}:00:00Z", i % 24),
            })
        })
        .collect();

    serde_json::json!({
        "version": 1,
        "variable": "ozone_ppb",
        "unit": "ppb",
        "grid": {
            "lat_min": lat_min,
            "lat_max": lat_max,
            "lon_min": lon_min,
            "lon_max": lon_max,
            "rows": rows,
            "cols": cols,
        },
        "hours": hours,
        "attribution": "synthetic test data",
    })
    .to_string()
}

/// Manifest for the 4x4 example with six forecast hours.
pub fn example_manifest_json() -> String {
    manifest_json(4, 4, bounds::EXAMPLE, 6)
}

/// A handful of monitoring stations across the eastern US.
pub fn sample_stations() -> Vec<StationPoint> {
    vec![
        StationPoint::new("NYC", 40.71, -74.01, 42.0).with_label("New York"),
        StationPoint::new("PHL", 39.95, -75.17, 67.0).with_label("Philadelphia"),
        StationPoint::new("BOS", 42.36, -71.06, 35.0),
        StationPoint::new("DCA", 38.90, -77.04, 118.0),
        StationPoint::new("ATL", 33.75, -84.39, 155.0),
        StationPoint::new("CHI", 41.88, -87.63, 88.0),
    ]
}
