//! Output color correction
//!
//! Gamma is applied first, then white calibration scales each primary.

use crate::ambient_pipeline::common::color::Rgb;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionSettings {
    /// Gamma exponent in tenths, values up to 10 disable gamma correction
    pub gamma: u32,
    pub wc_red: u8,
    pub wc_green: u8,
    pub wc_blue: u8,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            gamma: 0,
            wc_red: 255,
            wc_green: 255,
            wc_blue: 255,
        }
    }
}

impl CorrectionSettings {
    pub fn has_gamma(&self) -> bool {
        self.gamma > 10
    }

    pub fn has_white_calibration(&self) -> bool {
        self.wc_red != 255 || self.wc_green != 255 || self.wc_blue != 255
    }
}

/// Apply gamma and white calibration in place
pub fn apply(colors: &mut [Rgb], settings: &CorrectionSettings) {
    if settings.has_gamma() {
        let gamma = settings.gamma as f64 / 10.0;
        let curve = |x: u8| ((x as f64 / 255.0).powf(gamma) * 255.0) as u8;
        for c in colors.iter_mut() {
            *c = Rgb::new(curve(c.r), curve(c.g), curve(c.b));
        }
    }

    if settings.has_white_calibration() {
        let scale = |x: u8, wc: u8| (x as u32 * wc as u32 / 255) as u8;
        for c in colors.iter_mut() {
            *c = Rgb::new(
                scale(c.r, settings.wc_red),
                scale(c.g, settings.wc_green),
                scale(c.b, settings.wc_blue),
            );
        }
    }
}
