//! Analysis tuning types

use std::time::Duration;

/// Tunables read by the analyze loop on every iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeSettings {
    pub analyze_rate: Duration,
    pub analyze_size: u32,
    /// Ignored border per side in per mille
    pub overscan: u32,
    pub darkness_limit: u8,
    /// Edge weighting exponent in tenths
    pub edge_weighting: u32,
    pub hue_win_size: u32,
    pub sat_win_size: u32,
    /// Hue hysteresis threshold in percent
    pub hue_threshold: u32,
    /// Brightness scale in percent
    pub brightness: u32,
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            analyze_rate: Duration::from_millis(40),
            analyze_size: 1,
            overscan: 30,
            darkness_limit: 1,
            edge_weighting: 80,
            hue_win_size: 3,
            sat_win_size: 3,
            hue_threshold: 93,
            brightness: 100,
        }
    }
}

impl AnalyzeSettings {
    /// Width of the analyze image
    pub fn analyze_width(&self) -> u32 {
        (self.analyze_size + 1) * 64
    }
}
