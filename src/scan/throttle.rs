//! Fixed inter-page delay.
//!
//! The scanner is single-flight, so throttling is just a sleep on the one
//! task between receiving a page and requesting the next one. The throttle
//! tracks how long a run has spent waiting and warns once that becomes a
//! noticeable share of the run.

use std::time::Duration;

use tracing::{debug, warn};

/// Warning threshold for cumulative throttle delay within one scan.
const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(300);

/// Applies a fixed pause after each page fetch.
#[derive(Debug)]
pub struct PageThrottle {
    delay: Duration,
    cumulative: Duration,
    warned: bool,
}

impl PageThrottle {
    /// Creates a throttle pausing for `delay` per page. A zero delay disables it.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            cumulative: Duration::ZERO,
            warned: false,
        }
    }

    /// Returns whether pauses are skipped entirely.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.delay.is_zero()
    }

    /// Returns the per-page delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Total time spent paused so far.
    #[must_use]
    pub fn cumulative(&self) -> Duration {
        self.cumulative
    }

    /// Sleeps for the configured delay.
    pub async fn pause(&mut self) {
        if self.is_disabled() {
            return;
        }

        debug!(delay_ms = self.delay.as_millis(), "throttling before next page");
        tokio::time::sleep(self.delay).await;
        self.cumulative += self.delay;

        if !self.warned && self.cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD {
            self.warned = true;
            warn!(
                cumulative_secs = self.cumulative.as_secs(),
                "scan has spent a long time throttled; consider a narrower import window"
            );
        }
    }
}
