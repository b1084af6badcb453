//! Ozone forecast overlay.
//!
//! Walks the viewport on a fixed pixel raster, maps each cell back to a
//! geographic position and paints the bilinear sample of the forecast grid.

use rayon::prelude::*;
use tracing::debug;

use aq_common::Grid;
use grid_processor::{sample, Sample};
use projection::{Viewport, ViewportProjector};

use crate::frame::RasterFrame;
use crate::error::RenderResult;
use crate::heatmap::RenderOutcome;
use crate::style::{Color, OzoneStyle};

pub struct OzoneRenderer {
    style: OzoneStyle,
    projector: ViewportProjector,
    frame: Option<RasterFrame>,
}

impl OzoneRenderer {
    /// Create a renderer, rejecting styles that fail [`OzoneStyle::validate`].
    pub fn new(style: OzoneStyle) -> RenderResult<Self> {
        style.validate()?;
        Ok(Self::with_valid_style(style))
    }

    fn with_valid_style(style: OzoneStyle) -> Self {
        Self {
            style,
            projector: ViewportProjector::web_mercator(),
            frame: None,
        }
    }

    pub fn style(&self) -> &OzoneStyle {
        &self.style
    }

    pub fn frame(&self) -> Option<&RasterFrame> {
        self.frame.as_ref()
    }

    /// Paint `grid` for the viewport. Cells outside the grid or without data stay transparent.
    pub fn render(&mut self, grid: &Grid, viewport: &Viewport) -> RenderOutcome {
        let step = self.style.step_px;
        let visible = viewport
            .geo_bounds()
            .map_or(true, |view| view.intersects(grid.bounds()));

        let cells = if visible {
            self.sample_cells(grid, viewport)
        } else {
            debug!("Ozone grid is outside the viewport");
            Vec::new()
        };

        let frame = self.prepare(viewport);
        if let Some((min, max)) = grid.value_range() {
            frame.set_attribute("data-ozone-min", format!("{:.1}", min));
            frame.set_attribute("data-ozone-max", format!("{:.1}", max));
        }

        let mut painted = 0;
        for (row, row_cells) in cells.iter().enumerate() {
            for (col, cell) in row_cells.iter().enumerate() {
                if let Some(color) = cell {
                    frame.fill_rect(
                        col as i64 * step as i64,
                        row as i64 * step as i64,
                        step,
                        step,
                        *color,
                    );
                    painted += 1;
                }
            }
        }

        debug!(cells = painted, step, "Rendered ozone overlay");
        RenderOutcome::Redrawn { cells: painted }
    }

    /// Colour of every raster cell, row by row.
    fn sample_cells(&self, grid: &Grid, viewport: &Viewport) -> Vec<Vec<Option<Color>>> {
        let step = self.style.step_px;
        let cols = viewport.width_px.div_ceil(step);
        let rows = viewport.height_px.div_ceil(step);

        (0..rows)
            .into_par_iter()
            .map(|row| {
                let y = (row * step) as f64;
                (0..cols)
                    .map(|col| {
                        let geo = self.projector.unproject((col * step) as f64, y, viewport);
                        match sample(grid, geo.lat, geo.lon) {
                            Sample::Value(v) => Some(self.style.color(v)),
                            Sample::OutOfBounds | Sample::NoData => None,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Blank the frame, e.g. when the grid for this pass could not be loaded.
    pub fn clear(&mut self) {
        if let Some(frame) = self.frame.as_mut() {
            frame.clear();
        }
    }

    pub fn dispose(&mut self) {
        self.frame = None;
    }

    fn prepare(&mut self, viewport: &Viewport) -> &mut RasterFrame {
        let frame = self
            .frame
            .get_or_insert_with(|| RasterFrame::new(viewport.width_px, viewport.height_px));
        frame.resize(viewport.width_px, viewport.height_px);
        frame.clear();
        frame
    }
}

impl Default for OzoneRenderer {
    fn default() -> Self {
        Self::with_valid_style(OzoneStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[test]
    fn test_zero_step_is_rejected() {
        let style = OzoneStyle {
            step_px: 0,
            ..Default::default()
        };
        assert!(matches!(
            OzoneRenderer::new(style),
            Err(RenderError::Config(_))
        ));
        assert!(OzoneRenderer::new(OzoneStyle::default()).is_ok());
    }
}
