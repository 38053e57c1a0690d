use crate::ambient_pipeline::{
    common::color::Rgb,
    layout::{Area, ChannelLayout},
    output::serial::SerialProtocol,
};

const START_BYTE: u8 = 0xFF;

/// Copy the first channel of each listed area to its byte offset
fn place(msg: &mut [u8], layout: &ChannelLayout, colors: &[Rgb], slots: &[(Area, usize)]) {
    for &(area, at) in slots {
        let color = layout.index_of(area, 0).and_then(|i| colors.get(i));
        if let Some(c) = color {
            msg[at..at + 3].copy_from_slice(&[c.r, c.g, c.b]);
        }
    }
}

/// Classic five channel Atmolight controller
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicProtocol;

impl ClassicProtocol {
    pub const FRAME_LEN: usize = 19;
}

impl SerialProtocol for ClassicProtocol {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn encode(&self, layout: &ChannelLayout, colors: &[Rgb]) -> Vec<u8> {
        let mut msg = vec![0u8; Self::FRAME_LEN];
        msg[0] = START_BYTE;
        // start channel in bytes 1..3 stays zero
        msg[3] = 15;
        place(
            &mut msg,
            layout,
            colors,
            &[
                (Area::Center, 4),
                (Area::Left, 7),
                (Area::Right, 10),
                (Area::Top, 13),
                (Area::Bottom, 16),
            ],
        );
        msg
    }
}

/// Four channel DF4CH controller
#[derive(Debug, Clone, Copy, Default)]
pub struct Df4chProtocol;

impl Df4chProtocol {
    pub const FRAME_LEN: usize = 15;
}

impl SerialProtocol for Df4chProtocol {
    fn name(&self) -> &'static str {
        "df4ch"
    }

    fn encode(&self, layout: &ChannelLayout, colors: &[Rgb]) -> Vec<u8> {
        let mut msg = vec![0u8; Self::FRAME_LEN];
        msg[0] = START_BYTE;
        msg[2] = 12;
        place(
            &mut msg,
            layout,
            colors,
            &[
                (Area::Left, 3),
                (Area::Right, 6),
                (Area::Top, 9),
                (Area::Bottom, 12),
            ],
        );
        msg
    }
}
