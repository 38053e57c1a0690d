use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use crossbeam_channel::Sender;
use tracing::{info, trace, warn};

use crate::ambient_pipeline::{
    common::color::Rgb,
    config::OUTPUT_PERIOD,
    correction,
    filter::TemporalFilter,
    scheduler::shared::{LoopEvent, LoopKind, SharedDriver, SharedState, lock, sleep_while_running},
    source::AccessTicket,
};

/// Filters, corrects and transmits the analyzed colors every output period
pub(crate) struct OutputLoop {
    ticket: Arc<dyn AccessTicket>,
    shared: Arc<SharedState>,
    driver: SharedDriver,
    running: Arc<AtomicBool>,
    filter: TemporalFilter,
}

impl OutputLoop {
    pub fn new(
        ticket: Arc<dyn AccessTicket>,
        shared: Arc<SharedState>,
        driver: SharedDriver,
        running: Arc<AtomicBool>,
    ) -> Self {
        let filter = TemporalFilter::new(shared.channels());
        Self {
            ticket,
            shared,
            driver,
            running,
            filter,
        }
    }

    pub fn run(mut self, events: Sender<LoopEvent>) {
        info!("output loop running");
        let _ = events.send(LoopEvent::Started(LoopKind::Output));

        self.ticket.acquire();
        let n = self.shared.channels();
        let mut analyzed = vec![Rgb::BLACK; n];
        let mut out = vec![Rgb::BLACK; n];
        let mut last = vec![Rgb::BLACK; n];
        let started = Instant::now();
        self.filter.reset();

        while self.running.load(Ordering::Acquire) {
            if self.ticket.is_revoked() {
                info!("output loop waiting for new ticket");
                self.ticket.renew();
                info!("output loop got new ticket");
                self.filter.reset();
                continue;
            }

            let tick = Instant::now();
            let tuning = self.shared.tuning();

            self.shared.snapshot_into(&mut analyzed);
            out.copy_from_slice(self.filter.apply(&analyzed, &tuning.filter));
            correction::apply(&mut out, &tuning.correction);

            if started.elapsed() >= tuning.start_delay && out != last && self.send(&out, &last) {
                last.copy_from_slice(&out);
                self.shared.record_output(&last);
            }

            sleep_while_running(&self.running, OUTPUT_PERIOD.saturating_sub(tick.elapsed()));
        }

        if last.iter().any(|c| !c.is_black()) {
            let off = vec![Rgb::BLACK; n];
            if self.send(&off, &last) {
                self.shared.record_output(&off);
            }
        }

        self.ticket.release();
        info!("output loop terminated");
        let _ = events.send(LoopEvent::Exited(LoopKind::Output));
    }

    fn send(&self, colors: &[Rgb], last: &[Rgb]) -> bool {
        let mut driver = lock(&self.driver);
        match driver.output_colors(colors, Some(last)) {
            Ok(()) => {
                trace!("sent {} channels", colors.len());
                true
            }
            Err(e) => {
                warn!("{} output failed: {}", driver.name(), e);
                false
            }
        }
    }
}
