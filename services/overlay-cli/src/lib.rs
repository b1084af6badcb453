//! Command-line driver for the air-quality overlays.
//!
//! Opens a grid pack from a directory or URL, then renders ozone and
//! station frames to PNG, queries point values, and packs raw grids as npy.

pub mod commands;
pub mod source;
pub mod stations;

pub use commands::{FrameSummary, HourSummary, LegendKind};
pub use source::DataSource;
pub use stations::load_stations;
