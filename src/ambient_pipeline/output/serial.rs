//! Serial controllers
//!
//! Both serial protocols share device resolution, port setup and the
//! write-then-drain transmission; they differ only in the frame layout.

mod protocols;
mod registry;

#[cfg(test)]
mod tests;

use std::{io::Write, time::Duration};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, instrument, warn};

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError},
    layout::ChannelLayout,
    output::driver::OutputDriver,
};

pub use protocols::{ClassicProtocol, Df4chProtocol};
pub use registry::{USB_SERIAL_REGISTRY, UsbSerialRegistry, resolve_device};

pub const BAUD_RATE: u32 = 38400;
pub const PORT_TIMEOUT: Duration = Duration::from_millis(100);

/// Frame layout of one serial controller family
pub trait SerialProtocol: Send {
    fn name(&self) -> &'static str;

    /// Build the complete wire frame for `colors`
    fn encode(&self, layout: &ChannelLayout, colors: &[Rgb]) -> Vec<u8>;
}

/// Opened serial port; `flush` blocks until the output buffer is drained
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    #[instrument(level = "debug")]
    pub fn open(path: &str) -> Result<Self, DeviceError> {
        let mut port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(|source| DeviceError::SerialOpen {
                path: path.to_string(),
                source,
            })?;
        port.clear(ClearBuffer::All)?;
        Ok(Self { port })
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

pub struct SerialDriver<P: SerialProtocol> {
    protocol: P,
    layout: ChannelLayout,
    link: Option<Box<dyn Write + Send>>,
}

impl<P: SerialProtocol> SerialDriver<P> {
    pub fn new(protocol: P) -> Self {
        Self {
            protocol,
            layout: ChannelLayout::default(),
            link: None,
        }
    }

    /// Driver writing to an already opened link
    pub fn with_link(protocol: P, layout: ChannelLayout, link: Box<dyn Write + Send>) -> Self {
        Self {
            protocol,
            layout,
            link: Some(link),
        }
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }
}

impl<P: SerialProtocol> OutputDriver for SerialDriver<P> {
    fn name(&self) -> &'static str {
        self.protocol.name()
    }

    fn open(&mut self, param: &str, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        self.layout = *layout;
        self.link = None;

        let path = resolve_device(param)?;
        let link = SerialLink::open(&path)?;
        info!("{}: opened serial port {}", self.protocol.name(), path);
        self.link = Some(Box::new(link));
        Ok(())
    }

    fn configure(&mut self, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        self.layout = *layout;
        Ok(())
    }

    fn close(&mut self) {
        if self.link.take().is_some() {
            debug!("{}: serial port closed", self.protocol.name());
        }
    }

    fn output_colors(&mut self, colors: &[Rgb], _last: Option<&[Rgb]>) -> Result<(), DeviceError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };

        let msg = self.protocol.encode(&self.layout, colors);
        let written = link.write(&msg)?;
        if written == 0 {
            warn!("{}: nothing written to serial port", self.protocol.name());
            return Ok(());
        }
        if written < msg.len() {
            debug!("{}: short write {} of {} bytes", self.protocol.name(), written, msg.len());
        }
        link.flush()?;
        Ok(())
    }
}
