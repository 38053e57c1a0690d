//! DF10CH USB protocol constants and EEPROM configuration layout

use std::time::Duration;

use tracing::debug;

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError},
    layout::{Area, ChannelLayout},
};

pub const VENDOR_ID: u16 = 0x16c0;
pub const PRODUCT_ID: u16 = 0x05dc;
pub const MANUFACTURER: &str = "yak54@gmx.net";
pub const PRODUCT: &str = "DF10CH";
/// Serial number reported by the application firmware
pub const APPLICATION_SERIAL: &str = "AP";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);
/// Max. time waiting for all transfers of one frame
pub const REPLY_WAIT: Duration = Duration::from_millis(150);

pub const MAX_CHANNELS: usize = 30;
pub const CONFIG_SIZE: usize = 14 + MAX_CHANNELS * 6;
pub const CONFIG_VALID_ID: u16 = 0xA0A1;

pub const REQ_READ_EE_DATA: u8 = 1;
pub const PWM_REQ_GET_VERSION: u8 = 128;
pub const PWM_REQ_SET_BRIGHTNESS: u8 = 129;
pub const PWM_REQ_GET_MAX_PWM: u8 = 133;
pub const PWM_VERS_APPL: u8 = 0;

const LAYOUT_OFFSET: usize = 4;
const TOTAL_OFFSET: usize = 13;
const DESCRIPTOR_OFFSET: usize = 14;
const DESCRIPTOR_SIZE: usize = 6;
const MIN_GAMMA: u8 = 10;

/// Color primary driven by one PWM channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {
    Red,
    Green,
    Blue,
}

impl Primary {
    pub fn from_code(code: u8) -> Option<Primary> {
        match code {
            0 => Some(Primary::Red),
            1 => Some(Primary::Green),
            2 => Some(Primary::Blue),
            _ => None,
        }
    }

    #[inline]
    pub fn of(self, color: &Rgb) -> u8 {
        match self {
            Primary::Red => color.r,
            Primary::Green => color.g,
            Primary::Blue => color.b,
        }
    }
}

/// One EEPROM channel descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Slot in the SET_BRIGHTNESS payload
    pub req_channel: usize,
    pub area: Area,
    /// Channel index inside `area`
    pub area_num: usize,
    pub primary: Primary,
    /// Gamma in tenths, at least 10
    pub gamma: u8,
    pub white_cal: u16,
}

/// Decoded EEPROM configuration block of one controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub version: u16,
    pub layout: ChannelLayout,
    /// Number of 16-bit slots in the SET_BRIGHTNESS payload
    pub req_channels: usize,
    pub channels: Vec<ChannelConfig>,
}

#[inline]
fn le16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

impl DeviceConfig {
    pub fn parse(id: &str, data: &[u8]) -> Result<Self, DeviceError> {
        if data.len() < CONFIG_SIZE {
            return Err(DeviceError::UnexpectedReply {
                id: id.to_string(),
                what: "reading eeprom config data",
                actual: data.len(),
                expected: CONFIG_SIZE,
            });
        }
        if le16(data, 0) != CONFIG_VALID_ID {
            return Err(DeviceError::NotConfigured(id.to_string()));
        }

        // center and corners hold at most one channel, edges at most 25
        let mut layout = ChannelLayout::default();
        for (i, area) in Area::ALL.into_iter().enumerate() {
            *layout.count_mut(area) = (data[LAYOUT_OFFSET + i] as usize).min(area.max_channels());
        }

        let req_channels = (data[TOTAL_OFFSET] as usize).min(MAX_CHANNELS);
        let mut channels = Vec::with_capacity(req_channels);
        for n in 0..req_channels {
            let d = &data[DESCRIPTOR_OFFSET + n * DESCRIPTOR_SIZE..][..DESCRIPTOR_SIZE];
            let req_channel = d[0] as usize;
            let area = Area::from_code(d[1] >> 2);
            let primary = Primary::from_code(d[1] & 0x03);
            match (area, primary) {
                (Some(area), Some(primary)) if req_channel < req_channels => channels.push(ChannelConfig {
                    req_channel,
                    area,
                    area_num: d[2] as usize,
                    primary,
                    gamma: d[3].max(MIN_GAMMA),
                    white_cal: le16(d, 4),
                }),
                _ => debug!("{}: ignoring channel descriptor {}: {:02x?}", id, n, d),
            }
        }

        Ok(Self {
            version: le16(data, 2),
            layout,
            req_channels,
            channels,
        })
    }
}
