//! Station readings consumed by the heatmap and marker layers.

use serde::{Deserialize, Serialize};

/// A single monitoring station reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Scalar reading (AQI for the station layers)
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl StationPoint {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, value: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            value,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
