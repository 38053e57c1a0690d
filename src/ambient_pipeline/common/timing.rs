use std::time::{Duration, Instant};

/// Running transmit latency statistics
///
/// The average halves on every sample: `avg = (avg + sample) / 2`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    average: Duration,
    max: Duration,
    samples: u64,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample, returning `true` when it raised the maximum
    pub fn record(&mut self, sample: Duration) -> bool {
        self.average = (self.average + sample) / 2;
        self.samples += 1;
        if sample > self.max {
            self.max = sample;
            true
        } else {
            false
        }
    }

    pub fn average(&self) -> Duration {
        self.average
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
