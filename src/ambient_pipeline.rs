//! Ambient light pipeline module
//!
//! Grabs the displayed video picture, reduces it to one color per light
//! channel and drives the lighting hardware, with separate modules for
//! analysis, temporal filtering, color correction, output drivers and the
//! loop scheduling that ties them together.

pub mod analysis;
pub mod common;
pub mod config;
pub mod correction;
pub mod filter;
pub mod layout;
pub mod output;
pub mod scheduler;
pub mod source;

pub use common::{AtmoError, DeviceError, GrabError, Result, Rgb};

pub use config::{AtmoConfig, AtmoConfigBuilder};

pub use layout::{Area, ChannelLayout};

pub use analysis::{AnalyzeSettings, FrameAnalyzer};

pub use filter::{FilterMode, FilterSettings, TemporalFilter};

pub use output::{DriverKind, OutputDriver, create_driver};

pub use scheduler::{AtmoController, DriverFactory};

pub use source::{AccessTicket, Frame, FrameSource, GrabRequest, UnrestrictedTicket};
