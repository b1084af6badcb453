//! Inverse-distance-weighted AQI heatmap.
//!
//! Station readings are projected to screen space and blended on a coarse
//! raster: every cell takes the weighted mean of all stations with
//! `w = 1 / (1 + d² · decay)`, `d` in pixels, and is painted with the colour
//! of its AQI band. The cell size shrinks as the map zooms in.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use aq_common::StationPoint;
use projection::{Viewport, ViewportProjector};

use crate::error::{RenderError, RenderResult};
use crate::frame::RasterFrame;
use crate::style::aqi_color;

/// Raster cell size used from `min_zoom` upwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomStep {
    pub min_zoom: f64,
    pub step_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Thresholds checked from the highest `min_zoom` down
    pub step_thresholds: Vec<ZoomStep>,
    /// Cell size below every threshold
    pub base_step_px: u32,
    pub decay: f64,
    pub alpha: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            step_thresholds: vec![
                ZoomStep {
                    min_zoom: 8.0,
                    step_px: 12,
                },
                ZoomStep {
                    min_zoom: 6.0,
                    step_px: 16,
                },
                ZoomStep {
                    min_zoom: 4.0,
                    step_px: 24,
                },
            ],
            base_step_px: 32,
            decay: 0.0005,
            alpha: 0.5,
        }
    }
}

impl HeatmapConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HEATMAP_DECAY") {
            if let Ok(decay) = val.parse() {
                config.decay = decay;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_ALPHA") {
            if let Ok(alpha) = val.parse() {
                config.alpha = alpha;
            }
        }

        config
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.base_step_px == 0 || self.step_thresholds.iter().any(|s| s.step_px == 0) {
            return Err(RenderError::Config("raster steps must be > 0".to_string()));
        }
        if !(self.decay.is_finite() && self.decay >= 0.0) {
            return Err(RenderError::Config(
                "decay must be finite and >= 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(RenderError::Config("alpha must be within 0-1".to_string()));
        }
        Ok(())
    }

    /// Raster cell size for a zoom level.
    pub fn step_for_zoom(&self, zoom: f64) -> u32 {
        self.step_thresholds
            .iter()
            .filter(|s| zoom >= s.min_zoom)
            .max_by(|a, b| a.min_zoom.total_cmp(&b.min_zoom))
            .map_or(self.base_step_px, |s| s.step_px)
    }
}

/// A station reading in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSample {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Weighted mean of `samples` at a pixel position.
///
/// The weight sum is floored at 1 so an empty or distant set never divides by zero.
pub fn idw_value(samples: &[ScreenSample], x: f64, y: f64, decay: f64) -> f64 {
    let (weighted, total) = samples.iter().fold((0.0, 0.0), |(weighted, total), s| {
        let dx = s.x - x;
        let dy = s.y - y;
        let w = 1.0 / (1.0 + (dx * dx + dy * dy) * decay);
        (weighted + w * s.value, total + w)
    });
    weighted / f64::max(1.0, total)
}

/// Whether a render pass repainted the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Redrawn { cells: usize },
    /// Inputs match the previous pass
    Unchanged,
}

/// Renders station readings into an owned frame.
pub struct HeatmapRenderer {
    config: HeatmapConfig,
    projector: ViewportProjector,
    frame: Option<RasterFrame>,
    last_input: Option<(Viewport, Vec<StationPoint>)>,
}

impl HeatmapRenderer {
    /// Create a renderer, rejecting configs that fail [`HeatmapConfig::validate`].
    pub fn new(config: HeatmapConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: HeatmapConfig) -> Self {
        Self {
            config,
            projector: ViewportProjector::web_mercator(),
            frame: None,
            last_input: None,
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn frame(&self) -> Option<&RasterFrame> {
        self.frame.as_ref()
    }

    /// Repaint for a new viewport or station set.
    pub fn render(&mut self, points: &[StationPoint], viewport: &Viewport) -> RenderOutcome {
        if let (Some(_), Some((last_vp, last_points))) = (&self.frame, &self.last_input) {
            if last_vp == viewport && last_points.as_slice() == points {
                return RenderOutcome::Unchanged;
            }
        }

        let frame = self
            .frame
            .get_or_insert_with(|| RasterFrame::new(viewport.width_px, viewport.height_px));
        frame.resize(viewport.width_px, viewport.height_px);
        frame.clear();
        self.last_input = Some((*viewport, points.to_vec()));

        let samples: Vec<ScreenSample> = points
            .iter()
            .filter(|p| p.lat.is_finite() && p.lon.is_finite() && p.value.is_finite())
            .map(|p| {
                let screen = self.projector.project(p.lat, p.lon, viewport);
                ScreenSample {
                    x: screen.x,
                    y: screen.y,
                    value: p.value,
                }
            })
            .collect();

        if samples.is_empty() {
            debug!("No stations to interpolate");
            return RenderOutcome::Redrawn { cells: 0 };
        }

        let step = self.config.step_for_zoom(viewport.zoom);
        let decay = self.config.decay;
        let cols = viewport.width_px.div_ceil(step);
        let rows = viewport.height_px.div_ceil(step);

        let values: Vec<Vec<f64>> = (0..rows)
            .into_par_iter()
            .map(|row| {
                let y = (row * step) as f64;
                (0..cols)
                    .map(|col| idw_value(&samples, (col * step) as f64, y, decay))
                    .collect()
            })
            .collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (row, row_values) in values.iter().enumerate() {
            for (col, &value) in row_values.iter().enumerate() {
                min = min.min(value);
                max = max.max(value);
                frame.fill_rect(
                    col as i64 * step as i64,
                    row as i64 * step as i64,
                    step,
                    step,
                    aqi_color(value, self.config.alpha),
                );
            }
        }

        let cells = (rows * cols) as usize;
        if cells > 0 {
            frame.set_attribute("data-aqi-min", format!("{:.0}", min));
            frame.set_attribute("data-aqi-max", format!("{:.0}", max));
        }
        debug!(cells, step, stations = samples.len(), "Rendered AQI heatmap");
        RenderOutcome::Redrawn { cells }
    }

    /// Release the frame; the next render starts from scratch.
    pub fn dispose(&mut self) {
        self.frame = None;
        self.last_input = None;
    }
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self::with_valid_config(HeatmapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_for_zoom() {
        let config = HeatmapConfig::default();
        assert_eq!(config.step_for_zoom(3.9), 32);
        assert_eq!(config.step_for_zoom(4.0), 24);
        assert_eq!(config.step_for_zoom(6.5), 16);
        assert_eq!(config.step_for_zoom(8.0), 12);
        assert_eq!(config.step_for_zoom(14.0), 12);
    }

    #[test]
    fn test_idw_single_station_near_and_far() {
        let samples = [ScreenSample {
            x: 0.0,
            y: 0.0,
            value: 80.0,
        }];
        // at the station the weight is 1
        assert_eq!(idw_value(&samples, 0.0, 0.0, 0.0005), 80.0);
        // far away the weight sum is floored at 1, so the value fades
        let far = idw_value(&samples, 1000.0, 0.0, 0.0005);
        assert!((far - 80.0 / 501.0).abs() < 1e-9);
    }

    #[test]
    fn test_idw_no_samples() {
        assert_eq!(idw_value(&[], 10.0, 10.0, 0.0005), 0.0);
    }

    #[test]
    fn test_idw_two_stations_midpoint() {
        let samples = [
            ScreenSample {
                x: -10.0,
                y: 0.0,
                value: 40.0,
            },
            ScreenSample {
                x: 10.0,
                y: 0.0,
                value: 120.0,
            },
        ];
        assert!((idw_value(&samples, 0.0, 0.0, 0.0005) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_validation() {
        assert!(HeatmapConfig::default().validate().is_ok());
        let config = HeatmapConfig {
            decay: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let config = HeatmapConfig {
            step_thresholds: vec![],
            base_step_px: 0,
            ..Default::default()
        };
        assert!(matches!(
            HeatmapRenderer::new(config),
            Err(RenderError::Config(_))
        ));
        assert!(HeatmapRenderer::new(HeatmapConfig::default()).is_ok());
    }
}
