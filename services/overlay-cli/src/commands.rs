//! Subcommand implementations, kept free of argument parsing.

use anyhow::{bail, Context, Result};
use chrono::SecondsFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use aq_common::StationPoint;
use grid_processor::{OzoneService, PointValue};
use npy_parser::NpyVersion;
use projection::Viewport;
use renderer::{
    aqi_legend, cluster, legend_json, ozone_legend, place_markers, ClusterConfig, HeatmapConfig,
    HeatmapRenderer, LayerUpdate, OzoneForecastLayer, OzoneRenderer, OzoneStyle, PlacedMarker,
    RasterFrame,
};

/// One forecast hour as listed by `hours`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSummary {
    pub index: u32,
    pub file: String,
    pub timestamp: String,
}

/// What was written for a rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub drawn_pixels: usize,
    pub png_bytes: usize,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LegendKind {
    Aqi,
    Ozone,
}

pub async fn list_hours(service: &OzoneService) -> Result<Vec<HourSummary>> {
    let hours = service
        .forecast_hours()
        .await
        .context("Failed to load manifest")?;
    Ok(hours
        .into_iter()
        .map(|h| HourSummary {
            index: h.index,
            file: h.file,
            timestamp: h.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        })
        .collect())
}

pub async fn point_value(
    service: &OzoneService,
    lat: f64,
    lon: f64,
    hour_index: u32,
) -> Result<PointValue> {
    service
        .get_ozone_value(lat, lon, hour_index)
        .await
        .with_context(|| format!("Failed to sample hour {} at ({}, {})", hour_index, lat, lon))
}

/// Render one forecast hour through the ozone layer and write it as PNG.
pub async fn render_ozone(
    service: OzoneService,
    hour_index: u32,
    viewport: Viewport,
    style: OzoneStyle,
    output: &Path,
) -> Result<FrameSummary> {
    let renderer = OzoneRenderer::new(style).context("Invalid ozone style")?;
    let layer = OzoneForecastLayer::new(service, renderer);
    match layer
        .refresh(hour_index, viewport)
        .await
        .with_context(|| format!("Failed to load ozone grid for hour {}", hour_index))?
    {
        LayerUpdate::Painted { cells, .. } => info!(hour_index, cells, "Rendered ozone frame"),
        LayerUpdate::Stale { .. } => bail!("Ozone refresh was superseded"),
    }

    let frame = layer
        .snapshot()
        .await
        .context("Ozone layer produced no frame")?;
    write_frame(&frame, output)
}

/// Render the station heatmap and write it as PNG.
pub fn render_heatmap(
    stations: &[StationPoint],
    viewport: &Viewport,
    config: HeatmapConfig,
    output: &Path,
) -> Result<FrameSummary> {
    let mut renderer = HeatmapRenderer::new(config).context("Invalid heatmap configuration")?;
    renderer.render(stations, viewport);
    let frame = renderer
        .frame()
        .context("Heatmap renderer produced no frame")?;
    write_frame(frame, output)
}

/// Station markers for the viewport, clustered when zoomed out.
pub fn marker_layout(
    stations: &[StationPoint],
    viewport: &Viewport,
    config: &ClusterConfig,
) -> Vec<PlacedMarker> {
    let clustered = cluster(stations, viewport.zoom, config);
    place_markers(&clustered, viewport, config)
}

pub fn legend(kind: LegendKind, style: &OzoneStyle, ticks: usize) -> Result<String> {
    let entries = match kind {
        LegendKind::Aqi => aqi_legend(),
        LegendKind::Ozone => ozone_legend(style, ticks),
    };
    Ok(legend_json(&entries)?)
}

/// Pack a raw little-endian float32 file (row-major) as npy. Returns bytes written.
pub fn encode_raw(
    input: &Path,
    rows: usize,
    cols: usize,
    version: NpyVersion,
    output: &Path,
) -> Result<usize> {
    let raw = std::fs::read(input)
        .with_context(|| format!("Failed to read raw grid {}", input.display()))?;
    if raw.len() % 4 != 0 {
        bail!(
            "{} is {} bytes, not a whole number of float32 values",
            input.display(),
            raw.len()
        );
    }

    let values: Vec<f32> = raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let npy = npy_parser::encode_f32(rows, cols, &values, version)
        .with_context(|| format!("Cannot encode {} values as {}x{}", values.len(), rows, cols))?;

    std::fs::write(output, &npy)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), rows, cols, bytes = npy.len(), "Wrote npy grid");
    Ok(npy.len())
}

fn write_frame(frame: &RasterFrame, output: &Path) -> Result<FrameSummary> {
    let png = frame.to_png().context("Failed to encode PNG")?;
    std::fs::write(output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(FrameSummary {
        path: output.to_path_buf(),
        width: frame.width(),
        height: frame.height(),
        drawn_pixels: frame.drawn_pixels(),
        png_bytes: png.len(),
        attributes: frame.attributes().clone(),
    })
}
