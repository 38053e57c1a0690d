//! Pipeline scheduling module
//!
//! Runs the analyze and output loops on their own threads and owns the
//! output driver across enable, disable and live reconfiguration.

mod analyze_loop;
mod controller;
mod output_loop;
mod shared;


pub use controller::{AtmoController, DriverFactory};
pub use shared::{LoopEvent, LoopKind, SharedState, Tuning};
