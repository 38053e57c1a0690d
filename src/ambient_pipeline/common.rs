//! Common utilities module
//!
//! This module contains the error types, color primitives and timing helpers
//! shared across the ambient light pipeline.

pub mod color;
pub mod error;
pub mod timing;

#[cfg(test)]
mod tests;

pub use color::{Hsv, Rgb};
pub use error::{AtmoError, DeviceError, GrabError, Result, TransferError};
pub use timing::{LatencyStats, Timer};
