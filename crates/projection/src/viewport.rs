//! Viewport state and the screen projector.
//!
//! A [`Viewport`] is rebuilt on every pan/zoom/resize. The projector holds no
//! per-view state: every call takes the viewport explicitly.

use aq_common::GeoBounds;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::mercator::WebMercator;
use crate::{world_scale, WorldProjection, MAX_ZOOM};

/// Visible map window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Create a validated viewport.
    pub fn new(
        width_px: u32,
        height_px: u32,
        center_lat: f64,
        center_lon: f64,
        zoom: f64,
    ) -> Result<Self, ProjectionError> {
        if width_px == 0 || height_px == 0 {
            return Err(ProjectionError::InvalidViewport(format!(
                "size {}x{} must be positive",
                width_px, height_px
            )));
        }
        if !center_lat.is_finite() || !center_lon.is_finite() || center_lat.abs() > 90.0 {
            return Err(ProjectionError::InvalidViewport(format!(
                "center ({}, {}) is not a valid coordinate",
                center_lat, center_lon
            )));
        }
        if !(0.0..=MAX_ZOOM).contains(&zoom) {
            return Err(ProjectionError::InvalidViewport(format!(
                "zoom {} must be within 0-{}",
                zoom, MAX_ZOOM
            )));
        }
        Ok(Self {
            width_px,
            height_px,
            center_lat,
            center_lon,
            zoom,
        })
    }

    /// Same viewport after a pan.
    pub fn with_center(self, center_lat: f64, center_lon: f64) -> Result<Self, ProjectionError> {
        Self::new(self.width_px, self.height_px, center_lat, center_lon, self.zoom)
    }

    /// Same viewport after a zoom change.
    pub fn with_zoom(self, zoom: f64) -> Result<Self, ProjectionError> {
        Self::new(self.width_px, self.height_px, self.center_lat, self.center_lon, zoom)
    }

    /// Same viewport after a container resize.
    pub fn resized(self, width_px: u32, height_px: u32) -> Result<Self, ProjectionError> {
        Self::new(width_px, height_px, self.center_lat, self.center_lon, self.zoom)
    }

    /// Visible extent under the default Web Mercator transform.
    pub fn geo_bounds(&self) -> Option<GeoBounds> {
        ViewportProjector::web_mercator().visible_bounds(self)
    }

    fn half_size(&self) -> (f64, f64) {
        (self.width_px as f64 / 2.0, self.height_px as f64 / 2.0)
    }
}

/// A position in viewport pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Converts between geographic and viewport pixel coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportProjector<P = WebMercator> {
    projection: P,
}

impl ViewportProjector<WebMercator> {
    pub fn web_mercator() -> Self {
        Self {
            projection: WebMercator,
        }
    }
}

impl<P: WorldProjection> ViewportProjector<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }

    /// Geographic coordinates to viewport pixels.
    pub fn project(&self, lat: f64, lon: f64, viewport: &Viewport) -> ScreenPoint {
        let scale = world_scale(viewport.zoom);
        let (u, v) = self.projection.geo_to_world(lat, lon);
        let (cu, cv) = self
            .projection
            .geo_to_world(viewport.center_lat, viewport.center_lon);
        let (half_w, half_h) = viewport.half_size();
        ScreenPoint {
            x: (u - cu) * scale + half_w,
            y: (v - cv) * scale + half_h,
        }
    }

    /// Viewport pixels to geographic coordinates.
    pub fn unproject(&self, x: f64, y: f64, viewport: &Viewport) -> GeoPoint {
        let scale = world_scale(viewport.zoom);
        let (cu, cv) = self
            .projection
            .geo_to_world(viewport.center_lat, viewport.center_lon);
        let (half_w, half_h) = viewport.half_size();
        let (lat, lon) = self
            .projection
            .world_to_geo((x - half_w) / scale + cu, (y - half_h) / scale + cv);
        GeoPoint { lat, lon }
    }

    /// Geographic extent covered by the viewport.
    pub fn visible_bounds(&self, viewport: &Viewport) -> Option<GeoBounds> {
        let top_left = self.unproject(0.0, 0.0, viewport);
        let bottom_right = self.unproject(
            viewport.width_px as f64,
            viewport.height_px as f64,
            viewport,
        );
        GeoBounds::new(
            bottom_right.lat,
            top_left.lat,
            top_left.lon,
            bottom_right.lon,
        )
        .ok()
    }

    /// Check whether a pixel position is inside the viewport grown by `margin` pixels.
    pub fn on_screen(&self, point: ScreenPoint, viewport: &Viewport, margin: f64) -> bool {
        point.x >= -margin
            && point.y >= -margin
            && point.x <= viewport.width_px as f64 + margin
            && point.y <= viewport.height_px as f64 + margin
    }
}

/// Project with the default Web Mercator transform.
pub fn project(lat: f64, lon: f64, viewport: &Viewport) -> ScreenPoint {
    ViewportProjector::web_mercator().project(lat, lon, viewport)
}

/// Unproject with the default Web Mercator transform.
pub fn unproject(x: f64, y: f64, viewport: &Viewport) -> GeoPoint {
    ViewportProjector::web_mercator().unproject(x, y, viewport)
}
