//! Raster overlays for the air-quality map.
//!
//! Implements the overlay renderers:
//! - Ozone forecast grid (bilinear samples on a fixed pixel raster)
//! - Station AQI heatmap (inverse distance weighting)
//! - Station markers with zoomed-out clustering
//!
//! Frames are plain RGBA buffers that can be encoded with [`png`].

pub mod error;
pub mod frame;
pub mod heatmap;
pub mod layer;
pub mod markers;
pub mod ozone;
pub mod png;
pub mod style;

pub use error::{RenderError, RenderResult};
pub use frame::RasterFrame;
pub use heatmap::{idw_value, HeatmapConfig, HeatmapRenderer, RenderOutcome, ScreenSample};
pub use layer::{Generation, GenerationCounter, LayerUpdate, OzoneForecastLayer};
pub use markers::{cluster, place_markers, ClusterBucket, ClusterConfig, Clustered, PlacedMarker};
pub use ozone::OzoneRenderer;
pub use style::{aqi_color, aqi_legend, legend_json, ozone_legend, Color, LegendEntry, OzoneStyle};
