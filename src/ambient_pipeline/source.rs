//! Host frame source and access ticket contracts
//!
//! The media player side of the pipeline: a frame source that delivers
//! scaled RGB grabs of the displayed picture, and an access ticket that can
//! be revoked to pause both loops cooperatively.

use std::time::Duration;

use crate::ambient_pipeline::{
    analysis::AnalyzeSettings,
    common::error::GrabError,
    config::GRAB_TIMEOUT,
};

#[cfg(test)]
mod tests;

/// Packed 8-bit RGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Border cut from each side of the displayed picture before scaling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crop {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

/// Parameters of one grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabRequest {
    /// Size the grabbed picture is scaled to
    pub width: usize,
    pub height: usize,
    pub crop: Crop,
    pub timeout: Duration,
}

impl GrabRequest {
    /// Request for a display of `display_width` x `display_height`
    ///
    /// Returns `None` while the display has no usable size.
    pub fn for_display(display_width: usize, display_height: usize, settings: &AnalyzeSettings) -> Option<Self> {
        if display_width == 0 || display_height == 0 {
            return None;
        }

        let width = settings.analyze_width() as usize;
        let height = width * display_height / display_width;

        let overscan = settings.overscan as usize;
        let horizontal = display_width * overscan / 1000;
        let vertical = display_height * overscan / 1000;

        Some(Self {
            width,
            height,
            crop: Crop {
                left: horizontal,
                right: horizontal,
                top: vertical,
                bottom: vertical,
            },
            timeout: GRAB_TIMEOUT,
        })
    }

    /// Whether `frame` has exactly the requested size
    pub fn accepts(&self, frame: &Frame) -> bool {
        frame.width == self.width && frame.height == self.height && frame.data.len() >= self.width * self.height * 3
    }
}

/// Delivers grabs of the currently displayed picture
pub trait FrameSource: Send + Sync {
    /// Size of the displayed picture, `None` while nothing is shown
    fn display_size(&self) -> Option<(usize, usize)>;

    /// Grab the displayed picture, cropped and scaled as requested
    fn grab(&self, request: &GrabRequest) -> Result<Frame, GrabError>;

    /// Release any grab resources held for the caller
    fn release(&self) {}
}

/// Host access token gating frame reads and device output
pub trait AccessTicket: Send + Sync {
    fn acquire(&self);
    fn release(&self);
    fn is_revoked(&self) -> bool;
    /// Block until a revoked ticket is granted again
    fn renew(&self);
}

/// Ticket for hosts without pause support
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrestrictedTicket;

impl AccessTicket for UnrestrictedTicket {
    fn acquire(&self) {}

    fn release(&self) {}

    fn is_revoked(&self) -> bool {
        false
    }

    fn renew(&self) {}
}
