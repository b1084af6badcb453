//! US EPA AQI categories and the five render bands used on the map.

use serde::{Deserialize, Serialize};

/// Health category for an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_value(aqi: f64) -> Self {
        match aqi {
            v if v <= 50.0 => Self::Good,
            v if v <= 100.0 => Self::Moderate,
            v if v <= 150.0 => Self::UnhealthySensitive,
            v if v <= 200.0 => Self::Unhealthy,
            v if v <= 300.0 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy (SG)",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// Colour band for map layers. Everything above 200 shares one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiBand {
    Good,
    Moderate,
    Sensitive,
    Unhealthy,
    VeryUnhealthy,
}

impl AqiBand {
    pub const ALL: [AqiBand; 5] = [
        AqiBand::Good,
        AqiBand::Moderate,
        AqiBand::Sensitive,
        AqiBand::Unhealthy,
        AqiBand::VeryUnhealthy,
    ];

    pub fn from_value(aqi: f64) -> Self {
        match aqi {
            v if v <= 50.0 => Self::Good,
            v if v <= 100.0 => Self::Moderate,
            v if v <= 150.0 => Self::Sensitive,
            v if v <= 200.0 => Self::Unhealthy,
            _ => Self::VeryUnhealthy,
        }
    }

    /// RGB colour of the band.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Good => (0x22, 0xc5, 0x5e),
            Self::Moderate => (0xea, 0xb3, 0x08),
            Self::Sensitive => (0xf9, 0x73, 0x16),
            Self::Unhealthy => (0xdc, 0x26, 0x26),
            Self::VeryUnhealthy => (0x7e, 0x22, 0xce),
        }
    }

    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Legend label for the band's value range.
    pub fn range_label(&self) -> &'static str {
        match self {
            Self::Good => "0-50",
            Self::Moderate => "51-100",
            Self::Sensitive => "101-150",
            Self::Unhealthy => "151-200",
            Self::VeryUnhealthy => "201+",
        }
    }
}
