//! Colour scales for the AQI heatmap, the ozone overlay and the marker layer.

use serde::{Deserialize, Serialize};

use aq_common::AqiBand;

use crate::error::{RenderError, RenderResult};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Opaque colour with a fractional alpha in `[0, 1]` applied.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
pub fn interpolate_color(from: Color, to: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color::new(
        mix(from.r, to.r),
        mix(from.g, to.g),
        mix(from.b, to.b),
        mix(from.a, to.a),
    )
}

/// Band colour for an AQI value.
pub fn aqi_color(aqi: f64, alpha: f64) -> Color {
    let (r, g, b) = AqiBand::from_value(aqi).rgb();
    Color::new(r, g, b, 255).with_alpha(alpha)
}

const OZONE_LOW: Color = Color::new(0, 40, 180, 255);
const OZONE_HIGH: Color = Color::new(255, 0, 60, 255);

/// Ozone overlay colour ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OzoneStyle {
    /// Concentration (ppb) mapped to the top of the ramp
    pub scale_max: f64,
    pub alpha: f64,
    /// Raster cell size in CSS pixels
    pub step_px: u32,
}

impl Default for OzoneStyle {
    fn default() -> Self {
        Self {
            scale_max: 120.0,
            alpha: 0.35,
            step_px: 6,
        }
    }
}

impl OzoneStyle {
    /// Load the style from environment variables.
    pub fn from_env() -> Self {
        let mut style = Self::default();

        if let Ok(val) = std::env::var("OZONE_SCALE_MAX") {
            if let Ok(max) = val.parse() {
                style.scale_max = max;
            }
        }

        if let Ok(val) = std::env::var("OZONE_ALPHA") {
            if let Ok(alpha) = val.parse() {
                style.alpha = alpha;
            }
        }

        if let Ok(val) = std::env::var("OZONE_STEP_PX") {
            if let Ok(step) = val.parse() {
                style.step_px = step;
            }
        }

        style
    }

    pub fn validate(&self) -> RenderResult<()> {
        if !(self.scale_max.is_finite() && self.scale_max > 0.0) {
            return Err(RenderError::Config("scale_max must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(RenderError::Config("alpha must be within 0-1".to_string()));
        }
        if self.step_px == 0 {
            return Err(RenderError::Config("step_px must be > 0".to_string()));
        }
        Ok(())
    }

    /// Magenta-to-navy ramp: `n = clamp(v / scale_max)`, rgb `(255n, 40(1-n), 180(1-n) + 60n)`.
    pub fn color(&self, value: f64) -> Color {
        let n = (value / self.scale_max).clamp(0.0, 1.0);
        interpolate_color(OZONE_LOW, OZONE_HIGH, n).with_alpha(self.alpha)
    }
}

/// One row of a legend display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// The five AQI render bands, best first.
pub fn aqi_legend() -> Vec<LegendEntry> {
    AqiBand::ALL
        .iter()
        .map(|band| LegendEntry {
            label: band.range_label().to_string(),
            color: band.hex(),
        })
        .collect()
}

/// Evenly spaced ozone ticks from 0 to `scale_max`.
pub fn ozone_legend(style: &OzoneStyle, ticks: usize) -> Vec<LegendEntry> {
    let ticks = ticks.max(2);
    (0..ticks)
        .map(|i| {
            let value = style.scale_max * i as f64 / (ticks - 1) as f64;
            LegendEntry {
                label: format!("{:.0} ppb", value),
                color: style.color(value).to_hex(),
            }
        })
        .collect()
}

/// Serialize legend rows for a legend component.
pub fn legend_json(entries: &[LegendEntry]) -> RenderResult<String> {
    serde_json::to_string_pretty(entries).map_err(|e| RenderError::Encode(e.to_string()))
}
