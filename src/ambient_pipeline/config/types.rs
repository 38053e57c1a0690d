//! Configuration types

use std::time::Duration;

use crate::ambient_pipeline::{
    analysis::AnalyzeSettings,
    common::error::{AtmoError, Result},
    correction::CorrectionSettings,
    filter::{FilterMode, FilterSettings},
    layout::ChannelLayout,
    output::DriverKind,
};

/// Period of the output loop
pub const OUTPUT_PERIOD: Duration = Duration::from_millis(20);
/// Max. time waiting for the next grabbed image
pub const GRAB_TIMEOUT: Duration = Duration::from_millis(100);
/// Time waiting for loop termination when disabling
pub const THREAD_TERMINATION_WAIT: Duration = Duration::from_millis(150);

/// Complete parameter set of the ambient light pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmoConfig {
    pub enabled: bool,
    /// Selected output driver
    pub driver: DriverKind,
    /// Free-form driver parameter: a file name, a serial device path or
    /// `usb:<regex>`
    pub driver_param: String,
    /// Requested channel layout (the DF10CH driver replaces it)
    pub layout: ChannelLayout,
    /// Analyze period in milliseconds
    pub analyze_rate: u32,
    /// Analyze image width is `(analyze_size + 1) * 64`
    pub analyze_size: u32,
    /// Ignored border of the grabbed image, in per mille of each side
    pub overscan: u32,
    /// Pixels with a lower HSV value are treated as black
    pub darkness_limit: u8,
    /// Power of the edge weighting in tenths
    pub edge_weighting: u32,
    pub hue_win_size: u32,
    pub sat_win_size: u32,
    /// Hue hysteresis threshold in percent
    pub hue_threshold: u32,
    /// Brightness scale in percent
    pub brightness: u32,
    pub filter: FilterMode,
    pub filter_smoothness: u32,
    /// Mean filter length in milliseconds
    pub filter_length: u32,
    pub filter_threshold: u32,
    pub wc_red: u8,
    pub wc_green: u8,
    pub wc_blue: u8,
    /// Gamma exponent in tenths, values up to 10 disable gamma correction
    pub gamma: u32,
    /// Delay after start before the first frame is sent, in milliseconds
    pub start_delay: u32,
}

impl Default for AtmoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            driver: DriverKind::None,
            driver_param: String::new(),
            layout: ChannelLayout::default(),
            analyze_rate: 40,
            analyze_size: 1,
            overscan: 30,
            darkness_limit: 1,
            edge_weighting: 80,
            hue_win_size: 3,
            sat_win_size: 3,
            hue_threshold: 93,
            brightness: 100,
            filter: FilterMode::Combined,
            filter_smoothness: 50,
            filter_length: 500,
            filter_threshold: 40,
            wc_red: 255,
            wc_green: 255,
            wc_blue: 255,
            gamma: 0,
            start_delay: 250,
        }
    }
}

fn check(name: &'static str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(AtmoError::InvalidParameter {
            name,
            value: value as i64,
            min: min as i64,
            max: max as i64,
        });
    }
    Ok(())
}

impl AtmoConfig {
    pub fn builder() -> AtmoConfigBuilder {
        AtmoConfigBuilder::default()
    }

    /// Check every parameter against its allowed range
    pub fn validate(&self) -> Result<()> {
        let l = &self.layout;
        check("top", l.top as u64, 0, 25)?;
        check("bottom", l.bottom as u64, 0, 25)?;
        check("left", l.left as u64, 0, 25)?;
        check("right", l.right as u64, 0, 25)?;
        check("center", l.center as u64, 0, 1)?;
        check("top_left", l.top_left as u64, 0, 1)?;
        check("top_right", l.top_right as u64, 0, 1)?;
        check("bottom_left", l.bottom_left as u64, 0, 1)?;
        check("bottom_right", l.bottom_right as u64, 0, 1)?;
        check("analyze_rate", self.analyze_rate.into(), 10, 500)?;
        check("analyze_size", self.analyze_size.into(), 0, 3)?;
        check("overscan", self.overscan.into(), 0, 200)?;
        check("darkness_limit", self.darkness_limit.into(), 0, 100)?;
        check("edge_weighting", self.edge_weighting.into(), 10, 200)?;
        check("hue_win_size", self.hue_win_size.into(), 0, 5)?;
        check("sat_win_size", self.sat_win_size.into(), 0, 5)?;
        check("hue_threshold", self.hue_threshold.into(), 0, 100)?;
        check("brightness", self.brightness.into(), 50, 300)?;
        check("filter_smoothness", self.filter_smoothness.into(), 1, 100)?;
        check("filter_length", self.filter_length.into(), 300, 5000)?;
        check("filter_threshold", self.filter_threshold.into(), 1, 100)?;
        check("gamma", self.gamma.into(), 0, 30)?;
        check("start_delay", self.start_delay.into(), 0, 5000)?;
        Ok(())
    }

    pub fn analyze_settings(&self) -> AnalyzeSettings {
        AnalyzeSettings {
            analyze_rate: Duration::from_millis(self.analyze_rate.into()),
            analyze_size: self.analyze_size,
            overscan: self.overscan,
            darkness_limit: self.darkness_limit,
            edge_weighting: self.edge_weighting,
            hue_win_size: self.hue_win_size,
            sat_win_size: self.sat_win_size,
            hue_threshold: self.hue_threshold,
            brightness: self.brightness,
        }
    }

    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            mode: self.filter,
            smoothness: self.filter_smoothness,
            length_ms: self.filter_length,
            threshold: self.filter_threshold,
            output_period_ms: OUTPUT_PERIOD.as_millis() as u32,
        }
    }

    pub fn correction_settings(&self) -> CorrectionSettings {
        CorrectionSettings {
            gamma: self.gamma,
            wc_red: self.wc_red,
            wc_green: self.wc_green,
            wc_blue: self.wc_blue,
        }
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay.into())
    }

    /// Whether switching from `self` to `other` requires reopening the driver
    pub fn driver_changed(&self, other: &AtmoConfig) -> bool {
        self.driver != other.driver || self.driver_param != other.driver_param
    }
}

/// Builder for AtmoConfig
#[derive(Default)]
pub struct AtmoConfigBuilder {
    config: AtmoConfig,
}

impl AtmoConfigBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn driver(mut self, driver: DriverKind) -> Self {
        self.config.driver = driver;
        self
    }

    pub fn driver_param(mut self, param: impl Into<String>) -> Self {
        self.config.driver_param = param.into();
        self
    }

    pub fn layout(mut self, layout: ChannelLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn analyze_rate(mut self, ms: u32) -> Self {
        self.config.analyze_rate = ms;
        self
    }

    pub fn analyze_size(mut self, size: u32) -> Self {
        self.config.analyze_size = size;
        self
    }

    pub fn overscan(mut self, per_mille: u32) -> Self {
        self.config.overscan = per_mille;
        self
    }

    pub fn darkness_limit(mut self, limit: u8) -> Self {
        self.config.darkness_limit = limit;
        self
    }

    pub fn edge_weighting(mut self, weighting: u32) -> Self {
        self.config.edge_weighting = weighting;
        self
    }

    pub fn hue_win_size(mut self, size: u32) -> Self {
        self.config.hue_win_size = size;
        self
    }

    pub fn sat_win_size(mut self, size: u32) -> Self {
        self.config.sat_win_size = size;
        self
    }

    pub fn hue_threshold(mut self, percent: u32) -> Self {
        self.config.hue_threshold = percent;
        self
    }

    pub fn brightness(mut self, percent: u32) -> Self {
        self.config.brightness = percent;
        self
    }

    pub fn filter(mut self, mode: FilterMode) -> Self {
        self.config.filter = mode;
        self
    }

    pub fn filter_smoothness(mut self, percent: u32) -> Self {
        self.config.filter_smoothness = percent;
        self
    }

    pub fn filter_length(mut self, ms: u32) -> Self {
        self.config.filter_length = ms;
        self
    }

    pub fn filter_threshold(mut self, percent: u32) -> Self {
        self.config.filter_threshold = percent;
        self
    }

    pub fn white_calibration(mut self, red: u8, green: u8, blue: u8) -> Self {
        self.config.wc_red = red;
        self.config.wc_green = green;
        self.config.wc_blue = blue;
        self
    }

    pub fn gamma(mut self, tenths: u32) -> Self {
        self.config.gamma = tenths;
        self
    }

    pub fn start_delay(mut self, ms: u32) -> Self {
        self.config.start_delay = ms;
        self
    }

    pub fn build(self) -> AtmoConfig {
        self.config
    }
}
