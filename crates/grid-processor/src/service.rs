//! Ozone forecast data service.
//!
//! The interface the map layers and the point-query panel use. It owns no
//! state beyond the shared [`GridCache`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use aq_common::{Grid, GridManifest, ManifestHour};
use storage::{GridCache, LoaderResult};

use crate::sampler::{sample, Sample};

/// Ozone concentration at a point, `None` outside the grid or where it has no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointValue {
    pub value: Option<f64>,
}

#[derive(Clone)]
pub struct OzoneService {
    cache: Arc<GridCache>,
}

impl OzoneService {
    pub fn new(cache: Arc<GridCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<GridCache> {
        &self.cache
    }

    pub async fn manifest(&self) -> LoaderResult<Arc<GridManifest>> {
        self.cache.load_manifest().await
    }

    /// Forecast hours available for the time slider, in manifest order.
    pub async fn forecast_hours(&self) -> LoaderResult<Vec<ManifestHour>> {
        Ok(self.cache.load_manifest().await?.hours.clone())
    }

    /// Grid for one forecast hour.
    pub async fn get_ozone_grid(&self, hour_index: u32) -> LoaderResult<Arc<Grid>> {
        self.cache.load_grid(hour_index).await
    }

    /// Interpolated ozone value at a location for one forecast hour.
    ///
    /// Locations outside the manifest bounds return `None` without loading the grid.
    #[instrument(skip(self))]
    pub async fn get_ozone_value(
        &self,
        lat: f64,
        lon: f64,
        hour_index: u32,
    ) -> LoaderResult<PointValue> {
        let manifest = self.cache.load_manifest().await?;
        if !manifest.bounds().contains(lat, lon) {
            debug!("Point outside grid bounds");
            return Ok(PointValue { value: None });
        }

        let grid = self.cache.load_grid(hour_index).await?;
        let value = match sample(&grid, lat, lon) {
            Sample::Value(v) => Some(v),
            Sample::OutOfBounds | Sample::NoData => None,
        };
        Ok(PointValue { value })
    }
}
