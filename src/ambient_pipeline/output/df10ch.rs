//! DF10CH USB controller driver
//!
//! Every matching controller on the bus is opened and configured from its
//! EEPROM. The effective layout is the per-area maximum over all
//! controllers, and it replaces whatever layout was requested. Frames are
//! sent as one asynchronous SET_BRIGHTNESS control transfer per controller
//! whose mapped values changed; `output_colors` returns once all of them
//! completed or [`REPLY_WAIT`] elapsed.

mod controller;
pub mod gamma;
pub mod protocol;
pub mod transport;
mod usb;


use std::time::Instant;

use crossbeam_channel::Receiver;
use tracing::{debug, error, info, info_span, warn};

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError, timing::LatencyStats},
    layout::ChannelLayout,
    output::driver::OutputDriver,
};

pub use controller::{ChannelMapping, Completion, Controller};
pub use gamma::{GammaTable, GammaTableCache};
pub use protocol::{DeviceConfig, Primary, REPLY_WAIT};
pub use transport::{ControlTransport, ControllerBus, DiscoveredController};
pub use usb::{RusbBus, RusbTransport};

pub struct Df10chDriver<B: ControllerBus> {
    bus: B,
    controllers: Vec<Controller>,
    layout: ChannelLayout,
    tables: GammaTableCache,
    completions: Option<Receiver<Completion>>,
    latency: LatencyStats,
    round: u64,
}

impl<B: ControllerBus> Df10chDriver<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            controllers: Vec::new(),
            layout: ChannelLayout::default(),
            tables: GammaTableCache::new(),
            completions: None,
            latency: LatencyStats::new(),
            round: 0,
        }
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn gamma_tables(&self) -> &GammaTableCache {
        &self.tables
    }

    pub fn latency(&self) -> &LatencyStats {
        &self.latency
    }

    fn open_controllers(&mut self) -> Result<ChannelLayout, DeviceError> {
        let found = self.bus.discover()?;
        if found.is_empty() {
            return Err(DeviceError::NoControllers);
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut layout = ChannelLayout::default();
        let mut first_error = None;

        for device in found {
            let id = device.id.clone();
            match Controller::setup(device, &mut self.tables) {
                Ok(mut controller) => {
                    controller.start_worker(self.controllers.len(), sender.clone())?;
                    layout.merge_max(controller.layout());
                    self.controllers.push(controller);
                }
                Err(e) => {
                    warn!("{}: controller excluded: {}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if self.controllers.is_empty() {
            return Err(first_error.unwrap_or(DeviceError::NoControllers));
        }
        self.completions = Some(receiver);
        Ok(layout)
    }

    /// Collect the completions of `round`, giving up at the deadline
    fn wait_for_replies(&self, round: u64, mut pending: usize, deadline: Instant) {
        let Some(completions) = self.completions.as_ref() else {
            return;
        };
        while pending > 0 {
            match completions.recv_deadline(deadline) {
                Ok(done) if done.round == round => {
                    pending -= 1;
                    if let Err(e) = done.result {
                        let id = self.controllers.get(done.controller).map_or("DF10CH", |c| c.id());
                        warn!("{}: submitting USB control transfer message failed: {}", id, e);
                    }
                }
                Ok(stale) => debug!("late completion of round {}", stale.round),
                Err(_) => {
                    warn!("{} USB transfers still pending", pending);
                    break;
                }
            }
        }
    }
}

impl<B: ControllerBus> OutputDriver for Df10chDriver<B> {
    fn name(&self) -> &'static str {
        "df10ch"
    }

    fn open(&mut self, _param: &str, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        let _span = info_span!("df10ch_open").entered();
        self.close();

        match self.open_controllers() {
            Ok(merged) => {
                info!("{} controller(s), layout {}", self.controllers.len(), merged);
                self.layout = merged;
                *layout = merged;
                self.latency = LatencyStats::new();
                Ok(())
            }
            Err(e) => {
                error!("DF10CH open failed: {}", e);
                self.close();
                Err(e)
            }
        }
    }

    fn configure(&mut self, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        *layout = self.layout;
        Ok(())
    }

    fn close(&mut self) {
        if self.controllers.is_empty() && self.completions.is_none() {
            return;
        }
        info!("average transmit latency: {} [us]", self.latency.average().as_micros());

        for controller in &mut self.controllers {
            controller.stop_worker();
        }
        self.controllers.clear();
        self.completions = None;
        self.tables.clear();
    }

    fn output_colors(&mut self, colors: &[Rgb], last: Option<&[Rgb]>) -> Result<(), DeviceError> {
        if self.completions.is_none() {
            return Err(DeviceError::NotOpen);
        }

        self.round += 1;
        let round = self.round;
        let started = Instant::now();

        let mut pending = 0;
        for controller in &mut self.controllers {
            if controller.fill_payload(&self.layout, colors, last) && controller.submit(round) {
                pending += 1;
            }
        }
        if pending == 0 {
            return Ok(());
        }

        self.wait_for_replies(round, pending, started + REPLY_WAIT);

        let elapsed = started.elapsed();
        if self.latency.record(elapsed) {
            debug!(
                "max/avg transmit latency: {}/{} [us]",
                self.latency.max().as_micros(),
                self.latency.average().as_micros()
            );
        }
        Ok(())
    }
}

impl<B: ControllerBus> Drop for Df10chDriver<B> {
    fn drop(&mut self) {
        self.close();
    }
}
