use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use regex::Regex;
use tracing::info;

use crate::ambient_pipeline::common::error::DeviceError;

/// Kernel table of USB serial adapters
pub const USB_SERIAL_REGISTRY: &str = "/proc/tty/driver/usbserial";

const USB_PREFIX: &str = "usb:";

/// Device path for a driver parameter
///
/// A plain parameter is used as is; `usb:<regex>` is looked up in
/// [`USB_SERIAL_REGISTRY`].
pub fn resolve_device(param: &str) -> Result<String, DeviceError> {
    if param.is_empty() {
        return Err(DeviceError::MissingParameter);
    }

    let Some(pattern) = param.strip_prefix(USB_PREFIX) else {
        return Ok(param.to_string());
    };

    let file = File::open(USB_SERIAL_REGISTRY).map_err(|source| DeviceError::Registry {
        path: USB_SERIAL_REGISTRY.to_string(),
        source,
    })?;
    let registry = UsbSerialRegistry::new(BufReader::new(file));
    let device = registry.find(pattern)?;
    info!("USB tty device for '{}' is '{}'", pattern, device);
    Ok(device)
}

pub struct UsbSerialRegistry<R> {
    reader: R,
}

impl<R: BufRead> UsbSerialRegistry<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// `/dev/ttyUSB<n>` of the first entry matching `pattern`
    pub fn find(self, pattern: &str) -> Result<String, DeviceError> {
        let regex = Regex::new(pattern).map_err(|source| DeviceError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        for line in self.reader.lines() {
            let line = line?;
            if !regex.is_match(&line) {
                continue;
            }
            let Some((minor, _)) = line.split_once(':') else {
                continue;
            };
            let minor = minor.trim();
            if !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(format!("/dev/ttyUSB{}", minor));
            }
        }

        Err(DeviceError::DeviceNotFound(USB_SERIAL_REGISTRY.to_string()))
    }
}
