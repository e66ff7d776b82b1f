//! The resumable scan-and-remediate loop.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::report::ScanReport;
use super::throttle::PageThrottle;
use super::{ScanError, ScanState};
use crate::config::ScanOptions;
use crate::cursor::{CursorStore, StoreError};
use crate::fetch::{Page, PageSource, Pager, ScanRequest, SearchQuery};
use crate::record::Cursor;
use crate::remediation::{Remediator, Verifier};

/// Drives one scan at a time over the injected capabilities.
///
/// Per page the order is fixed: throttle, persist the page's `next` cursor,
/// then verify and remediate each record in page order. Persisting first
/// means a crash mid-page never re-fetches that page on restart; records
/// left unprocessed by the crash are not retried.
pub struct ScanController {
    source: Arc<dyn PageSource>,
    store: Arc<dyn CursorStore>,
    verifier: Arc<dyn Verifier>,
    remediator: Arc<dyn Remediator>,
    options: ScanOptions,
}

impl ScanController {
    /// Creates a controller from its capabilities.
    #[must_use]
    pub fn new(
        source: Arc<dyn PageSource>,
        store: Arc<dyn CursorStore>,
        verifier: Arc<dyn Verifier>,
        remediator: Arc<dyn Remediator>,
        options: ScanOptions,
    ) -> Self {
        Self {
            source,
            store,
            verifier,
            remediator,
            options,
        }
    }

    /// Returns the controller options.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Runs one scan from the stored cursor to the end of the stream.
    ///
    /// Cancellation is checked only before each page fetch, so a page that
    /// has been fetched always finishes its persist-then-process sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] on a page fetch failure, a cursor save failure,
    /// or a cursor load failure (unless configured to tolerate it). Failures
    /// on individual records are collected in the report instead.
    #[instrument(
        skip(self, cancel),
        fields(domain = %request.filters.domain, cookie_name = %request.filters.cookie_name)
    )]
    pub async fn run_scan(
        &self,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::default();

        let cursor = match self.load_cursor().await {
            Ok(cursor) => cursor,
            Err(source) => {
                report.enter(ScanState::Failed);
                return Err(ScanError::CursorLoad {
                    source,
                    report: Box::new(report),
                });
            }
        };
        info!(cursor = ?cursor.as_ref().map(Cursor::as_str), "Starting scan");
        report.starting_cursor.clone_from(&cursor);

        let query = SearchQuery::build(cursor, request, Utc::now());
        let mut pager = Pager::new(self.source.as_ref(), query);
        let mut throttle = PageThrottle::new(self.options.page_delay);

        loop {
            if cancel.is_cancelled() {
                info!(pages = report.pages, "Cancellation requested; stopping before next page");
                report.cancel();
                return Ok(report);
            }

            report.enter(ScanState::FetchingPage);
            let page = match pager.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(source) => {
                    report.enter(ScanState::Failed);
                    return Err(ScanError::Fetch {
                        page: pager.requests(),
                        source,
                        report: Box::new(report),
                    });
                }
            };

            report.pages += 1;
            report.fetched += page.items.len();
            info!(page = report.pages, count = page.items.len(), "Fetched cookies");

            throttle.pause().await;

            if let Some(next) = &page.next {
                report.enter(ScanState::PersistingCursor);
                if let Err(source) = self.store.save(next).await {
                    report.enter(ScanState::Failed);
                    return Err(ScanError::CursorSave {
                        cursor: next.clone(),
                        source,
                        report: Box::new(report),
                    });
                }
                report.last_saved_cursor = Some(next.clone());
            }

            report.enter(ScanState::ProcessingRecords);
            self.process_page(&page, &mut report).await;
        }

        report.enter(ScanState::Done);
        info!(
            pages = report.pages,
            fetched = report.fetched,
            remediated = report.remediated,
            skipped = report.skipped,
            failed = report.failures.len(),
            throttled_ms = throttle.cumulative().as_millis(),
            "Scan complete"
        );
        Ok(report)
    }

    async fn load_cursor(&self) -> Result<Option<Cursor>, StoreError> {
        match self.store.get().await {
            Ok(cursor) => Ok(cursor),
            Err(error) if self.options.tolerate_cursor_load_errors => {
                warn!(error = %error, "Cursor unreadable; starting from the beginning of the stream");
                Ok(None)
            }
            Err(source) => Err(source),
        }
    }

    async fn process_page(&self, page: &Page, report: &mut ScanReport) {
        for record in &page.items {
            match self.verifier.verify(record).await {
                Ok(false) => {
                    debug!(cookie = %record.label(), "cookie no longer actionable, skipping");
                    report.skipped += 1;
                }
                Ok(true) => match self.remediator.remediate(record).await {
                    Ok(()) => report.remediated += 1,
                    Err(error) => {
                        warn!(error = %error, "Remediation failed; continuing with next cookie");
                        report.failures.push(error);
                    }
                },
                Err(error) => {
                    warn!(error = %error, "Verification failed; continuing with next cookie");
                    report.failures.push(error);
                }
            }
        }
    }
}

impl std::fmt::Debug for ScanController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanController")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
