//! Sample-rate throttling for provider position updates.
//!
//! Providers can deliver fixes far faster than the evaluator needs them.
//! The throttle accepts at most one sample per configured interval,
//! discarding the rest. The first sample is always accepted: the
//! last-accepted time starts at a "never" sentinel.

use std::time::{Duration, Instant};

/// Default minimum interval between accepted samples.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(2000);

/// Accepts at most one position sample per interval.
#[derive(Debug)]
pub struct SampleThrottle {
    interval: Duration,
    /// Capture time of the last accepted sample, `None` until the first.
    last_accepted: Option<Instant>,
}

impl SampleThrottle {
    /// Create a throttle with the given acceptance interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Decide whether a sample captured at `at` should be accepted.
    ///
    /// Accepting updates the internal last-accepted time; rejected samples
    /// leave it untouched so a burst of updates cannot starve acceptance.
    pub fn accept(&mut self, at: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if at.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(at);
        true
    }

    /// Forget the last accepted sample; the next one is always accepted.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }

    /// The configured acceptance interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for SampleThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}
