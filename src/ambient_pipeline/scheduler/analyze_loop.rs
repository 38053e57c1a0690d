use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crossbeam_channel::Sender;
use tracing::{debug, error, info, trace};

use crate::ambient_pipeline::{
    analysis::{AnalyzeSettings, FrameAnalyzer},
    common::{color::Rgb, error::GrabError, timing::Timer},
    layout::ChannelLayout,
    scheduler::shared::{LoopEvent, LoopKind, SharedState, sleep_while_running},
    source::{AccessTicket, FrameSource, GrabRequest},
};

/// Grabs the displayed picture every analyze period and publishes the
/// per-channel colors
pub(crate) struct AnalyzeLoop {
    source: Arc<dyn FrameSource>,
    ticket: Arc<dyn AccessTicket>,
    shared: Arc<SharedState>,
    running: Arc<AtomicBool>,
    analyzer: FrameAnalyzer,
}

impl AnalyzeLoop {
    pub fn new(
        source: Arc<dyn FrameSource>,
        ticket: Arc<dyn AccessTicket>,
        shared: Arc<SharedState>,
        running: Arc<AtomicBool>,
        layout: ChannelLayout,
    ) -> Self {
        Self {
            source,
            ticket,
            shared,
            running,
            analyzer: FrameAnalyzer::new(layout),
        }
    }

    pub fn run(mut self, events: Sender<LoopEvent>) {
        info!("analyze loop running");
        let _ = events.send(LoopEvent::Started(LoopKind::Analyze));

        self.ticket.acquire();
        let mut colors = vec![Rgb::BLACK; self.shared.channels()];

        while self.running.load(Ordering::Acquire) {
            if self.ticket.is_revoked() {
                self.source.release();
                info!("analyze loop waiting for new ticket");
                self.ticket.renew();
                info!("analyze loop got new ticket");
                continue;
            }

            let timer = Timer::start("analyze");
            let settings = self.shared.tuning().analyze;
            if !self.step(&settings, &mut colors) {
                break;
            }

            let (_, elapsed) = timer.stop();
            trace!("analyze cycle took {:.3}ms", elapsed.as_secs_f64() * 1000.0);
            sleep_while_running(&self.running, settings.analyze_rate.saturating_sub(elapsed));
        }

        self.source.release();
        self.analyzer.release_buffers();
        self.ticket.release();
        info!("analyze loop terminated");
        let _ = events.send(LoopEvent::Exited(LoopKind::Analyze));
    }

    /// One grab and analysis; `false` once the source cannot grab at all
    fn step(&mut self, settings: &AnalyzeSettings, colors: &mut [Rgb]) -> bool {
        let Some(request) = self
            .source
            .display_size()
            .and_then(|(w, h)| GrabRequest::for_display(w, h, settings))
        else {
            trace!("no picture to grab");
            return true;
        };

        match self.source.grab(&request) {
            Ok(frame) if request.accepts(&frame) => {
                self.analyzer.analyze_frame(&frame, settings, colors);
                self.shared.publish(colors);
            }
            Ok(frame) => trace!(
                "skipping grab of {}x{}, requested {}x{}",
                frame.width, frame.height, request.width, request.height
            ),
            Err(GrabError::Unsupported) => {
                error!("{}", GrabError::Unsupported);
                return false;
            }
            Err(e) => debug!("{}", e),
        }
        true
    }
}
