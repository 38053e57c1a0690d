//! Pipeline configuration module
//!
//! The full parameter set accepted by the enable / live-reconfigure entry
//! point, with their defaults and allowed ranges.

pub mod types;


pub use types::{
    AtmoConfig, AtmoConfigBuilder, GRAB_TIMEOUT, OUTPUT_PERIOD, THREAD_TERMINATION_WAIT,
};
