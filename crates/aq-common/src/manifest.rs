//! Forecast grid manifest: which file holds which forecast hour.
//!
//! The wire format is the `manifest.json` published next to the grid files:
//!
//! ```json
//! {
//!   "version": 1,
//!   "variable": "ozone_ppb",
//!   "unit": "ppb",
//!   "grid": { "lat_min": 24.0, "lat_max": 50.0, "lon_min": -125.0, "lon_max": -66.0, "rows": 240, "cols": 400 },
//!   "hours": [ { "index": 0, "file": "ozone_h00.npy", "timestamp": "2025-10-04T00:00:00Z" } ],
//!   "attribution": "mock"
//! }
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;
use crate::error::{AqError, AqResult};
use crate::grid::GridMeta;

/// Manifest exactly as published (before validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawManifest {
    pub version: u32,
    pub variable: String,
    pub unit: String,
    pub grid: RawGridSpec,
    pub hours: Vec<ManifestHour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGridSpec {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub rows: usize,
    pub cols: usize,
}

/// One addressable forecast hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestHour {
    pub index: u32,
    pub file: String,
    pub timestamp: DateTime<Utc>,
}

/// A validated manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridManifest {
    pub version: u32,
    pub variable: String,
    pub unit: String,
    pub meta: GridMeta,
    pub hours: Vec<ManifestHour>,
    pub attribution: Option<String>,
}

impl GridManifest {
    /// Parse and validate a manifest from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> AqResult<Self> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;
        Self::try_from(raw)
    }

    /// Look up an hour entry by its index.
    pub fn hour(&self, index: u32) -> Option<&ManifestHour> {
        self.hours.iter().find(|h| h.index == index)
    }

    /// Grid metadata copied into every decoded grid.
    pub fn grid_meta(&self) -> GridMeta {
        self.meta
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.meta.bounds
    }

    /// Hour indices in manifest order.
    pub fn hour_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.hours.iter().map(|h| h.index)
    }
}

impl TryFrom<RawManifest> for GridManifest {
    type Error = AqError;

    fn try_from(raw: RawManifest) -> AqResult<Self> {
        let bounds = GeoBounds::new(
            raw.grid.lat_min,
            raw.grid.lat_max,
            raw.grid.lon_min,
            raw.grid.lon_max,
        )?;
        let meta = GridMeta::new(raw.grid.rows, raw.grid.cols, bounds)?;

        let mut seen = HashSet::with_capacity(raw.hours.len());
        for hour in &raw.hours {
            if !seen.insert(hour.index) {
                return Err(AqError::InvalidManifest(format!(
                    "duplicate hour index {}",
                    hour.index
                )));
            }
            if hour.file.trim().is_empty() {
                return Err(AqError::InvalidManifest(format!(
                    "hour {} has an empty file name",
                    hour.index
                )));
            }
        }

        Ok(Self {
            version: raw.version,
            variable: raw.variable,
            unit: raw.unit,
            meta,
            hours: raw.hours,
            attribution: raw.attribution,
        })
    }
}
