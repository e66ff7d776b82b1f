//! Scan orchestration: cursor, pages, verification, remediation.
//!
//! # State machine
//!
//! ```text
//! LoadingCursor -> FetchingPage -> (exhausted) -> Done
//!                  FetchingPage -> PersistingCursor -> ProcessingRecords -> FetchingPage
//!                  (cancel observed before FetchingPage) -> Cancelled
//! any state -> Failed
//! ```

mod controller;
mod report;
mod throttle;

pub use controller::ScanController;
pub use report::{ScanOutcome, ScanReport};
pub use throttle::PageThrottle;

use std::fmt;

use thiserror::Error;

use crate::cursor::StoreError;
use crate::fetch::FetchError;
use crate::record::Cursor;

/// States a single scan moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Reading the stored cursor.
    #[default]
    LoadingCursor,
    /// Waiting on the next page request.
    FetchingPage,
    /// Writing the page's continuation token.
    PersistingCursor,
    /// Verifying and remediating the page's records.
    ProcessingRecords,
    /// Stream exhausted.
    Done,
    /// Stopped between pages on request.
    Cancelled,
    /// Stopped on an unrecovered error.
    Failed,
}

impl ScanState {
    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadingCursor => "loading_cursor",
            Self::FetchingPage => "fetching_page",
            Self::PersistingCursor => "persisting_cursor",
            Self::ProcessingRecords => "processing_records",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Returns true for states that end a run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecovered errors that end a scan in [`ScanState::Failed`].
///
/// Every variant carries the partial [`ScanReport`] of the failed run, so
/// record failures collected before the abort are still reported.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A page request failed.
    #[error("failed to fetch page {page}: {source}")]
    Fetch {
        /// 1-indexed request number within the run.
        page: usize,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
        /// Progress made before the failure.
        report: Box<ScanReport>,
    },

    /// The stored cursor could not be read.
    #[error("failed to load scan cursor: {source}")]
    CursorLoad {
        /// The underlying store error.
        #[source]
        source: StoreError,
        /// Progress made before the failure.
        report: Box<ScanReport>,
    },

    /// A page's continuation token could not be persisted.
    #[error("failed to persist scan cursor {cursor}: {source}")]
    CursorSave {
        /// The cursor that was being saved.
        cursor: Cursor,
        /// The underlying store error.
        #[source]
        source: StoreError,
        /// Progress made before the failure.
        report: Box<ScanReport>,
    },
}

impl ScanError {
    /// Returns the fetch error behind a [`ScanError::Fetch`].
    #[must_use]
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the partial report of the failed run.
    #[must_use]
    pub fn report(&self) -> &ScanReport {
        match self {
            Self::Fetch { report, .. }
            | Self::CursorLoad { report, .. }
            | Self::CursorSave { report, .. } => report,
        }
    }

    /// Returns the partial report mutably.
    pub fn report_mut(&mut self) -> &mut ScanReport {
        match self {
            Self::Fetch { report, .. }
            | Self::CursorLoad { report, .. }
            | Self::CursorSave { report, .. } => report,
        }
    }
}
