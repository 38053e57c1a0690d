use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, info_span, warn};

use crate::ambient_pipeline::{
    common::{
        color::Rgb,
        error::{AtmoError, Result},
    },
    config::{AtmoConfig, THREAD_TERMINATION_WAIT},
    layout::ChannelLayout,
    output::{DriverKind, OutputDriver, create_driver},
    scheduler::{
        analyze_loop::AnalyzeLoop,
        output_loop::OutputLoop,
        shared::{LoopEvent, LoopKind, SharedDriver, SharedState, Tuning, lock},
    },
    source::{AccessTicket, FrameSource},
};

/// Max. time waiting for a freshly spawned loop to report in
const START_CONFIRMATION_WAIT: Duration = Duration::from_secs(1);

/// Builds the driver for a [`DriverKind`], `None` when there is no driver
pub type DriverFactory = Box<dyn Fn(DriverKind) -> Option<Box<dyn OutputDriver>> + Send + Sync>;

struct RunningLoops {
    running: Arc<AtomicBool>,
    events: Receiver<LoopEvent>,
    handles: Vec<(LoopKind, JoinHandle<()>)>,
    exited: Vec<LoopKind>,
}

/// Entry point of the ambient light pipeline
///
/// Owns the output driver and the two loop threads. Every parameter change
/// goes through [`apply`](AtmoController::apply), which decides whether the
/// change can be picked up live or needs a driver reopen or a restart.
pub struct AtmoController {
    source: Arc<dyn FrameSource>,
    ticket: Arc<dyn AccessTicket>,
    factory: DriverFactory,
    config: AtmoConfig,
    layout: ChannelLayout,
    driver: Option<SharedDriver>,
    shared: Option<Arc<SharedState>>,
    loops: Option<RunningLoops>,
}

impl AtmoController {
    pub fn new(source: Arc<dyn FrameSource>, ticket: Arc<dyn AccessTicket>) -> Self {
        Self::with_driver_factory(source, ticket, Box::new(create_driver))
    }

    pub fn with_driver_factory(
        source: Arc<dyn FrameSource>,
        ticket: Arc<dyn AccessTicket>,
        factory: DriverFactory,
    ) -> Self {
        Self {
            source,
            ticket,
            factory,
            config: AtmoConfig {
                enabled: false,
                ..AtmoConfig::default()
            },
            layout: ChannelLayout::default(),
            driver: None,
            shared: None,
            loops: None,
        }
    }

    /// Last accepted configuration
    pub fn config(&self) -> &AtmoConfig {
        &self.config
    }

    /// Layout in effect, possibly replaced by the driver
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn is_running(&self) -> bool {
        self.loops.is_some()
    }

    pub fn driver_open(&self) -> bool {
        self.driver.is_some()
    }

    /// Enable, disable or reconfigure the pipeline
    ///
    /// An invalid configuration is rejected without touching the running
    /// pipeline. Otherwise the configuration is adopted even when opening the
    /// driver fails, so the next call retries the open.
    pub fn apply(&mut self, config: AtmoConfig) -> Result<()> {
        config.validate()?;
        let previous = std::mem::replace(&mut self.config, config);

        if !self.config.enabled {
            if previous.enabled {
                info!("disabling ambient light");
            }
            self.stop_loops();
            self.close_driver();
            return Ok(());
        }

        if !previous.enabled || self.driver.is_none() || previous.driver_changed(&self.config) {
            self.stop_loops();
            self.close_driver();
            self.open_driver()?;
            return self.start();
        }

        if previous.layout != self.config.layout {
            info!("channel layout changed, restarting");
            self.stop_loops();
            self.configure_driver()?;
            return self.start();
        }

        if let Some(shared) = &self.shared {
            shared.set_tuning(Tuning::from_config(&self.config));
            debug!("tuning updated");
        }
        Ok(())
    }

    /// Stop both loops and release the driver
    pub fn shutdown(&mut self) {
        self.stop_loops();
        self.close_driver();
    }

    fn open_driver(&mut self) -> Result<()> {
        let _span = info_span!("open_driver", driver = %self.config.driver).entered();

        let Some(mut driver) = (self.factory)(self.config.driver) else {
            error!("{}", AtmoError::NoDriverSelected);
            return Err(AtmoError::NoDriverSelected);
        };

        let mut layout = self.config.layout;
        if let Err(e) = driver.open(&self.config.driver_param, &mut layout) {
            error!("can't open output driver: {}", e);
            driver.close();
            return Err(e.into());
        }

        info!("{} output driver opened, {}", driver.name(), layout);
        self.layout = layout;
        self.driver = Some(Arc::new(Mutex::new(driver)));
        Ok(())
    }

    fn configure_driver(&mut self) -> Result<()> {
        let Some(driver) = &self.driver else {
            return Err(AtmoError::NoDriverSelected);
        };
        let mut layout = self.config.layout;
        lock(driver).configure(&mut layout)?;
        self.layout = layout;
        Ok(())
    }

    fn close_driver(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        let mut driver = lock(&driver);

        if let Some(shared) = self.shared.take() {
            let last = shared.last_output();
            if last.iter().any(|c| !c.is_black()) {
                let off = vec![Rgb::BLACK; last.len()];
                if let Err(e) = driver.output_colors(&off, Some(&last)) {
                    warn!("could not switch lights off: {}", e);
                }
            }
        }

        driver.close();
        info!("output driver closed");
    }

    fn start(&mut self) -> Result<()> {
        let Some(driver) = self.driver.clone() else {
            return Err(AtmoError::NoDriverSelected);
        };

        let channels = self.layout.total();
        if channels == 0 {
            info!("no channels configured, pipeline stays stopped");
            return Err(AtmoError::NoChannels);
        }

        let shared = Arc::new(SharedState::new(channels, Tuning::from_config(&self.config)));
        self.shared = Some(Arc::clone(&shared));

        {
            let zeros = vec![Rgb::BLACK; channels];
            let mut driver = lock(&driver);
            if let Err(e) = driver.output_colors(&zeros, None) {
                warn!("initial {} output failed: {}", driver.name(), e);
            }
        }

        let running = Arc::new(AtomicBool::new(true));
        let (events_tx, events) = crossbeam_channel::unbounded();
        let mut loops = RunningLoops {
            running: Arc::clone(&running),
            events,
            handles: Vec::with_capacity(2),
            exited: Vec::new(),
        };

        let analyze = AnalyzeLoop::new(
            Arc::clone(&self.source),
            Arc::clone(&self.ticket),
            Arc::clone(&shared),
            Arc::clone(&running),
            self.layout,
        );
        let handle = spawn_loop(LoopKind::Analyze, events_tx.clone(), move |tx| analyze.run(tx))?;
        loops.handles.push((LoopKind::Analyze, handle));

        let output = OutputLoop::new(Arc::clone(&self.ticket), shared, driver, running);
        match spawn_loop(LoopKind::Output, events_tx, move |tx| output.run(tx)) {
            Ok(handle) => loops.handles.push((LoopKind::Output, handle)),
            Err(e) => {
                self.loops = Some(loops);
                self.stop_loops();
                return Err(e);
            }
        }

        let mut started = Vec::with_capacity(loops.handles.len());
        while started.len() < loops.handles.len() {
            match loops.events.recv_timeout(START_CONFIRMATION_WAIT) {
                Ok(LoopEvent::Started(kind)) => {
                    debug!("{} loop started", kind);
                    started.push(kind);
                }
                Ok(LoopEvent::Exited(kind)) => loops.exited.push(kind),
                Err(_) => {
                    let missing = loops
                        .handles
                        .iter()
                        .map(|(kind, _)| *kind)
                        .find(|kind| !started.contains(kind))
                        .unwrap_or(LoopKind::Output);
                    self.loops = Some(loops);
                    self.stop_loops();
                    return Err(AtmoError::ThreadStart { name: missing.name() });
                }
            }
        }

        info!("ambient light running with {} channels", channels);
        self.loops = Some(loops);
        Ok(())
    }

    /// Signal both loops to stop and join those that exit within the grace
    /// period; late ones are detached
    fn stop_loops(&mut self) {
        let Some(mut loops) = self.loops.take() else {
            return;
        };
        loops.running.store(false, Ordering::Release);

        let deadline = Instant::now() + THREAD_TERMINATION_WAIT;
        while loops.exited.len() < loops.handles.len() {
            let left = deadline.saturating_duration_since(Instant::now());
            match loops.events.recv_timeout(left) {
                Ok(LoopEvent::Exited(kind)) => loops.exited.push(kind),
                Ok(LoopEvent::Started(_)) => {}
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }

        for (kind, handle) in loops.handles {
            if !loops.exited.contains(&kind) {
                warn!("{} loop did not terminate in time", kind);
                continue;
            }
            if handle.join().is_err() {
                error!("{} loop panicked", kind);
            }
        }
        debug!("loops stopped");
    }
}

impl Drop for AtmoController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_loop<F>(kind: LoopKind, events: Sender<LoopEvent>, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce(Sender<LoopEvent>) + Send + 'static,
{
    thread::Builder::new()
        .name(format!("atmo-{}", kind))
        .spawn(move || body(events))
        .map_err(|source| AtmoError::ThreadSpawn {
            name: kind.name(),
            source,
        })
}
