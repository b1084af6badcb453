//! The ozone forecast layer: loads a grid, then paints it if still wanted.
//!
//! Grid loads for different hours can finish in any order. Every refresh
//! takes a generation token up front and only paints when that token is
//! still the latest one once the grid has arrived.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use grid_processor::OzoneService;
use projection::Viewport;
use storage::LoaderError;

use crate::frame::RasterFrame;
use crate::heatmap::RenderOutcome;
use crate::ozone::OzoneRenderer;

/// Token identifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding all earlier ones.
    pub fn next(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current.load(Ordering::SeqCst) == generation.0
    }
}

/// What a refresh did to the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerUpdate {
    Painted { hour_index: u32, cells: usize },
    /// A newer refresh started before this one's grid arrived
    Stale { generation: Generation },
}

pub struct OzoneForecastLayer {
    service: OzoneService,
    renderer: Mutex<OzoneRenderer>,
    generations: GenerationCounter,
}

impl OzoneForecastLayer {
    pub fn new(service: OzoneService, renderer: OzoneRenderer) -> Self {
        Self {
            service,
            renderer: Mutex::new(renderer),
            generations: GenerationCounter::new(),
        }
    }

    pub fn service(&self) -> &OzoneService {
        &self.service
    }

    /// Token of the most recent refresh or hide.
    pub fn current_generation(&self) -> Generation {
        self.generations.current()
    }

    /// Load the grid for `hour_index` and paint it for `viewport`.
    ///
    /// A failed load blanks the layer and returns the error; the layer is
    /// left as it was when the result turns out to be stale.
    pub async fn refresh(
        &self,
        hour_index: u32,
        viewport: Viewport,
    ) -> Result<LayerUpdate, LoaderError> {
        let generation = self.generations.next();
        let result = self.service.get_ozone_grid(hour_index).await;

        let mut renderer = self.renderer.lock().await;
        if !self.generations.is_current(generation) {
            match &result {
                Ok(_) => warn!(
                    hour_index,
                    generation = generation.value(),
                    "Discarding stale ozone grid"
                ),
                Err(e) => warn!(
                    hour_index,
                    generation = generation.value(),
                    error = %e,
                    "Discarding stale ozone load failure"
                ),
            }
            return Ok(LayerUpdate::Stale { generation });
        }

        match result {
            Ok(grid) => {
                let cells = match renderer.render(&grid, &viewport) {
                    RenderOutcome::Redrawn { cells } => cells,
                    RenderOutcome::Unchanged => 0,
                };
                debug!(hour_index, cells, "Painted ozone layer");
                Ok(LayerUpdate::Painted { hour_index, cells })
            }
            Err(e) => {
                renderer.clear();
                warn!(hour_index, error = %e, "Ozone layer refresh failed");
                Err(e)
            }
        }
    }

    /// Drop the frame and invalidate any refresh still in flight.
    pub async fn hide(&self) {
        self.generations.next();
        self.renderer.lock().await.dispose();
    }

    /// Copy of the current frame, if one has been painted.
    pub async fn snapshot(&self) -> Option<RasterFrame> {
        self.renderer.lock().await.frame().cloned()
    }
}
