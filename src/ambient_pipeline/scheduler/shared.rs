//! State shared between the controller and the two loops

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::ambient_pipeline::{
    analysis::AnalyzeSettings,
    common::color::Rgb,
    config::AtmoConfig,
    correction::CorrectionSettings,
    filter::FilterSettings,
    output::OutputDriver,
};

/// Output driver handle shared by the controller and the output loop
pub(crate) type SharedDriver = Arc<Mutex<Box<dyn OutputDriver>>>;

/// Longest single sleep of a loop, bounding how late a stop request is seen
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Lock a mutex, recovering the data of a poisoned one
///
/// Every guarded value here is plain data that stays consistent even if a
/// holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sleep up to `duration`, returning early once `running` is cleared
pub(crate) fn sleep_while_running(running: &AtomicBool, duration: Duration) {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::Acquire) {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        thread::sleep(left.min(SLEEP_SLICE));
    }
}

/// Tunables both loops pick up on every iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub analyze: AnalyzeSettings,
    pub filter: FilterSettings,
    pub correction: CorrectionSettings,
    pub start_delay: Duration,
}

impl Tuning {
    pub fn from_config(config: &AtmoConfig) -> Self {
        Self {
            analyze: config.analyze_settings(),
            filter: config.filter_settings(),
            correction: config.correction_settings(),
            start_delay: config.start_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Analyze,
    Output,
}

impl LoopKind {
    pub fn name(self) -> &'static str {
        match self {
            LoopKind::Analyze => "analyze",
            LoopKind::Output => "output",
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle notification sent by a loop thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Started(LoopKind),
    Exited(LoopKind),
}

/// Analyzed colors, last transmitted colors and live tuning
///
/// Color buffers are sized once per start and never change length.
#[derive(Debug)]
pub struct SharedState {
    channels: usize,
    analyzed: Mutex<Vec<Rgb>>,
    last_output: Mutex<Vec<Rgb>>,
    tuning: Mutex<Tuning>,
}

impl SharedState {
    pub fn new(channels: usize, tuning: Tuning) -> Self {
        Self {
            channels,
            analyzed: Mutex::new(vec![Rgb::BLACK; channels]),
            last_output: Mutex::new(vec![Rgb::BLACK; channels]),
            tuning: Mutex::new(tuning),
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Replace the analyzed colors with the result of a new analysis
    pub fn publish(&self, colors: &[Rgb]) {
        let mut analyzed = lock(&self.analyzed);
        let n = analyzed.len().min(colors.len());
        analyzed[..n].copy_from_slice(&colors[..n]);
    }

    /// Copy the most recent analyzed colors into `out`
    pub fn snapshot_into(&self, out: &mut [Rgb]) {
        let analyzed = lock(&self.analyzed);
        let n = analyzed.len().min(out.len());
        out[..n].copy_from_slice(&analyzed[..n]);
    }

    pub fn record_output(&self, colors: &[Rgb]) {
        let mut last = lock(&self.last_output);
        let n = last.len().min(colors.len());
        last[..n].copy_from_slice(&colors[..n]);
    }

    /// Colors of the last frame the driver accepted
    pub fn last_output(&self) -> Vec<Rgb> {
        lock(&self.last_output).clone()
    }

    pub fn tuning(&self) -> Tuning {
        *lock(&self.tuning)
    }

    pub fn set_tuning(&self, tuning: Tuning) {
        *lock(&self.tuning) = tuning;
    }
}
