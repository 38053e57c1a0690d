//! Temporal filtering module
//!
//! Smooths the analyzed colors across output periods, either with a plain
//! percentage decay or with a moving mean that snaps to the new color when a
//! scene cut is detected.

mod temporal_filter;
pub mod types;

#[cfg(test)]
mod tests;

pub use temporal_filter::TemporalFilter;
pub use types::{FilterMode, FilterSettings};
