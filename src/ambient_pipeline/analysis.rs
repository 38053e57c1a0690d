//! Frame analysis module
//!
//! Turns a grabbed RGB frame into one representative color per channel:
//! RGB to HSV conversion, weighted hue/saturation histograms with
//! triangular windowing, dominant hue selection with hysteresis, dominant
//! saturation, average brightness and HSV to RGB composition.

mod analyzer;
pub mod histogram;
pub mod hsv;
pub mod types;
mod weight;

#[cfg(test)]
mod tests;

pub use analyzer::FrameAnalyzer;
pub use histogram::{BUCKETS, Histograms};
pub use hsv::{hsv_to_rgb, rgb_to_hsv};
pub use types::AnalyzeSettings;
pub use weight::WeightMap;
