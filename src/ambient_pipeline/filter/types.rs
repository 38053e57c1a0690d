use std::{fmt, str::FromStr};

use crate::ambient_pipeline::common::error::AtmoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Off,
    Percentage,
    /// Moving mean with scene cut detection followed by a percentage blend
    #[default]
    Combined,
}

impl FilterMode {
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Off => "off",
            FilterMode::Percentage => "percentage",
            FilterMode::Combined => "combined",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterMode {
    type Err = AtmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(FilterMode::Off),
            "percentage" => Ok(FilterMode::Percentage),
            "combined" => Ok(FilterMode::Combined),
            _ => Err(AtmoError::UnknownVariant {
                kind: "filter mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Filter tunables, read once per output period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    pub mode: FilterMode,
    /// Share of the previous output kept per period, in percent
    pub smoothness: u32,
    /// Length of the moving mean in milliseconds
    pub length_ms: u32,
    /// Scene cut distance in percent of the RGB cube diagonal
    pub threshold: u32,
    pub output_period_ms: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            mode: FilterMode::Combined,
            smoothness: 50,
            length_ms: 500,
            threshold: 40,
            output_period_ms: 20,
        }
    }
}

impl FilterSettings {
    /// Number of output periods covered by the moving mean
    pub fn mean_length(&self) -> i64 {
        if self.output_period_ms == 0 || self.length_ms < self.output_period_ms {
            1
        } else {
            (self.length_ms / self.output_period_ms) as i64
        }
    }

    /// Euclidean RGB distance above which a scene cut is assumed
    pub fn jump_threshold(&self) -> i64 {
        (self.threshold as f64 * 3.6) as i64
    }
}
