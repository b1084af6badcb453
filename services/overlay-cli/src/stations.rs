//! Station readings from JSON files.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use aq_common::StationPoint;

/// Read a JSON array of `{ id, lat, lon, value, label? }` objects.
pub fn load_stations(path: &Path) -> Result<Vec<StationPoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stations from {}", path.display()))?;
    let stations: Vec<StationPoint> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid station file {}", path.display()))?;
    debug!(count = stations.len(), path = %path.display(), "Loaded stations");
    Ok(stations)
}
