//! Per-run scan summary.

use tracing::debug;

use super::ScanState;
use crate::record::Cursor;
use crate::remediation::RemediationError;

/// How a scan that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOutcome {
    /// The page sequence was exhausted.
    #[default]
    Completed,
    /// Cancellation was observed between pages.
    Cancelled,
}

/// Counters and record-level failures from one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// How the run ended.
    pub outcome: ScanOutcome,
    /// Last state the run entered; terminal once the run has returned.
    pub state: ScanState,
    /// Cursor loaded at the start of the run.
    pub starting_cursor: Option<Cursor>,
    /// Most recent cursor persisted during this run.
    pub last_saved_cursor: Option<Cursor>,
    /// Pages received (empty terminal pages are not counted).
    pub pages: usize,
    /// Records received across all pages.
    pub fetched: usize,
    /// Records the verifier rejected.
    pub skipped: usize,
    /// Records successfully remediated.
    pub remediated: usize,
    /// Records whose verification or remediation failed, for manual follow-up.
    pub failures: Vec<RemediationError>,
}

impl ScanReport {
    /// Returns true when every actionable record was remediated.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns true when the run stopped early on cancellation.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.outcome == ScanOutcome::Cancelled
    }

    /// Returns true once the run has reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn enter(&mut self, state: ScanState) {
        debug!(from = %self.state, to = %state, "scan state");
        self.state = state;
    }

    /// Marks the run cancelled.
    pub(crate) fn cancel(&mut self) {
        self.outcome = ScanOutcome::Cancelled;
        self.enter(ScanState::Cancelled);
    }
}
