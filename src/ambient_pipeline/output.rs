//! Output driver module
//!
//! Device abstraction for the lighting hardware plus its four variants: a
//! text file logger, two serial protocols and the USB DF10CH controller
//! family.

pub mod df10ch;
mod driver;
pub mod file_logger;
pub mod serial;

#[cfg(test)]
mod tests;

pub use df10ch::Df10chDriver;
pub use driver::{DriverKind, OutputDriver, create_driver};
pub use file_logger::FileLogger;
pub use serial::{ClassicProtocol, Df4chProtocol, SerialDriver, SerialProtocol};
