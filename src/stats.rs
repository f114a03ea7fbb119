//! Streaming statistics for throughput reporting.

use crate::config::ConfigError;
use std::collections::VecDeque;

/// Fixed-window moving average with a derived sample rate.
///
/// Samples are `(value, timestamp)` pairs with timestamps in
/// **milliseconds**; the reported rate is scaled to a per-second figure.
/// Once the window is full the oldest sample is evicted before the new one
/// is inserted, so the window never exceeds its capacity and the returned
/// average and rate reflect exactly the retained samples.
#[derive(Clone, Debug)]
pub struct MovingAverage {
    window: usize,
    samples: VecDeque<(f64, u64)>,
    sum: f64,
}

impl MovingAverage {
    /// Create a tracker retaining at most `window` samples. The window must
    /// hold at least one sample.
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
        })
    }

    /// Add a sample and return the updated `(average, rate)`.
    ///
    /// The rate is the retained sum per second of retained time span; a
    /// zero span (including a window of size one) reports rate 0.
    pub fn add(&mut self, value: f64, timestamp_ms: u64) -> (f64, f64) {
        if self.samples.len() == self.window {
            if let Some((evicted, _)) = self.samples.pop_front() {
                self.sum -= evicted;
            }
        }
        self.samples.push_back((value, timestamp_ms));
        self.sum += value;

        let average = self.sum / self.samples.len() as f64;
        let oldest = self.samples.front().map_or(timestamp_ms, |&(_, t)| t);
        let span = timestamp_ms.saturating_sub(oldest);
        let rate = if span == 0 {
            0.0
        } else {
            self.sum * 1000.0 / span as f64
        };
        (average, rate)
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
