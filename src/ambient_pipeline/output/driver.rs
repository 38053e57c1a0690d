use std::{fmt, str::FromStr};

use crate::ambient_pipeline::{
    common::{
        color::Rgb,
        error::{AtmoError, DeviceError},
    },
    layout::ChannelLayout,
    output::{
        df10ch::{Df10chDriver, RusbBus},
        file_logger::FileLogger,
        serial::{ClassicProtocol, Df4chProtocol, SerialDriver},
    },
};

/// Lighting device
///
/// Colors are always passed in canonical channel order of the layout the
/// driver was opened or configured with.
pub trait OutputDriver: Send {
    fn name(&self) -> &'static str;

    /// Acquire the device for `param`
    ///
    /// A driver that knows the physical channel layout replaces `layout`
    /// with it; the caller must adopt the result.
    fn open(&mut self, param: &str, layout: &mut ChannelLayout) -> Result<(), DeviceError>;

    /// Apply a new layout without reopening
    fn configure(&mut self, layout: &mut ChannelLayout) -> Result<(), DeviceError>;

    /// Release the device; safe after a failed or partial open
    fn close(&mut self);

    /// Send one frame; `last` is `None` for the first packet after open
    fn output_colors(&mut self, colors: &[Rgb], last: Option<&[Rgb]>) -> Result<(), DeviceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverKind {
    #[default]
    None,
    File,
    Classic,
    Df4ch,
    Df10ch,
}

impl DriverKind {
    pub const ALL: [DriverKind; 5] = [
        DriverKind::None,
        DriverKind::File,
        DriverKind::Classic,
        DriverKind::Df4ch,
        DriverKind::Df10ch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DriverKind::None => "none",
            DriverKind::File => "file",
            DriverKind::Classic => "classic",
            DriverKind::Df4ch => "df4ch",
            DriverKind::Df10ch => "df10ch",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriverKind {
    type Err = AtmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| AtmoError::UnknownVariant {
                kind: "output driver",
                value: s.to_string(),
            })
    }
}

/// Driver instance for `kind`, `None` for [`DriverKind::None`]
pub fn create_driver(kind: DriverKind) -> Option<Box<dyn OutputDriver>> {
    match kind {
        DriverKind::None => None,
        DriverKind::File => Some(Box::new(FileLogger::new())),
        DriverKind::Classic => Some(Box::new(SerialDriver::new(ClassicProtocol))),
        DriverKind::Df4ch => Some(Box::new(SerialDriver::new(Df4chProtocol))),
        DriverKind::Df10ch => Some(Box::new(Df10chDriver::new(RusbBus))),
    }
}
