//! Station markers: 1-degree clustering when zoomed out, and screen placement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use aq_common::StationPoint;
use projection::{ScreenPoint, Viewport, ViewportProjector};

use crate::style::{aqi_color, Color};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Zoom below which stations are bucketed
    pub cluster_below_zoom: f64,
    /// Markers this far outside the viewport (px) are still placed
    pub margin_px: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_below_zoom: 5.0,
            margin_px: 24.0,
        }
    }
}

impl ClusterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CLUSTER_BELOW_ZOOM") {
            if let Ok(zoom) = val.parse() {
                config.cluster_below_zoom = zoom;
            }
        }

        config
    }
}

/// Stations sharing one rounded lat/lon cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterBucket {
    /// `"{round(lat)}:{round(lon)}"`
    pub key: String,
    pub count: usize,
    pub value_sum: f64,
    /// Rounded cell latitude
    pub lat: f64,
    /// Rounded cell longitude
    pub lon: f64,
}

impl ClusterBucket {
    pub fn mean(&self) -> f64 {
        self.value_sum / self.count as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clustered {
    /// Buckets ordered by cell
    Buckets(Vec<ClusterBucket>),
    /// Stations unchanged, in input order
    Points(Vec<StationPoint>),
}

impl Clustered {
    pub fn len(&self) -> usize {
        match self {
            Clustered::Buckets(b) => b.len(),
            Clustered::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group stations into 1-degree cells below the configured zoom.
///
/// Stations with non-finite coordinates cannot be placed in a cell and are skipped.
pub fn cluster(points: &[StationPoint], zoom: f64, config: &ClusterConfig) -> Clustered {
    if zoom >= config.cluster_below_zoom {
        return Clustered::Points(points.to_vec());
    }

    let mut cells: BTreeMap<(i64, i64), ClusterBucket> = BTreeMap::new();
    for point in points {
        if !(point.lat.is_finite() && point.lon.is_finite()) {
            debug!(id = %point.id, "Skipping station without a position");
            continue;
        }
        let lat = point.lat.round();
        let lon = point.lon.round();
        let bucket = cells
            .entry((lat as i64, lon as i64))
            .or_insert_with(|| ClusterBucket {
                key: format!("{}:{}", lat as i64, lon as i64),
                count: 0,
                value_sum: 0.0,
                lat,
                lon,
            });
        bucket.count += 1;
        bucket.value_sum += point.value;
    }

    Clustered::Buckets(cells.into_values().collect())
}

/// A marker positioned in viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub color: Color,
    /// Stations represented by the marker
    pub count: usize,
    /// Station id for single stations
    pub station_id: Option<String>,
}

/// Project markers and drop those outside the viewport plus margin.
///
/// Single stations are labelled with their rounded value, buckets with their
/// station count; both are coloured by the AQI band of the (mean) value.
pub fn place_markers(
    clustered: &Clustered,
    viewport: &Viewport,
    config: &ClusterConfig,
) -> Vec<PlacedMarker> {
    let projector = ViewportProjector::web_mercator();
    let band_color = |value: f64| aqi_color(value, 1.0);

    let candidates: Vec<PlacedMarker> = match clustered {
        Clustered::Buckets(buckets) => buckets
            .iter()
            .map(|bucket| {
                let p = projector.project(bucket.lat, bucket.lon, viewport);
                PlacedMarker {
                    x: p.x,
                    y: p.y,
                    label: bucket.count.to_string(),
                    color: band_color(bucket.mean()),
                    count: bucket.count,
                    station_id: None,
                }
            })
            .collect(),
        Clustered::Points(points) => points
            .iter()
            .filter(|s| s.lat.is_finite() && s.lon.is_finite())
            .map(|station| {
                let p = projector.project(station.lat, station.lon, viewport);
                PlacedMarker {
                    x: p.x,
                    y: p.y,
                    label: format!("{:.0}", station.value),
                    color: band_color(station.value),
                    count: 1,
                    station_id: Some(station.id.clone()),
                }
            })
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|m| {
            projector.on_screen(
                ScreenPoint { x: m.x, y: m.y },
                viewport,
                config.margin_px,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_mean() {
        let bucket = ClusterBucket {
            key: "40:-74".to_string(),
            count: 4,
            value_sum: 200.0,
            lat: 40.0,
            lon: -74.0,
        };
        assert_eq!(bucket.mean(), 50.0);
    }

    #[test]
    fn test_negative_zero_key() {
        let points = [StationPoint::new("a", -0.3, 0.2, 10.0)];
        match cluster(&points, 2.0, &ClusterConfig::default()) {
            Clustered::Buckets(b) => assert_eq!(b[0].key, "0:0"),
            other => panic!("expected buckets, got {:?}", other),
        }
    }
}
