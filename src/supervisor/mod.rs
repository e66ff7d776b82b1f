//! Outer supervisor that retries whole scans on transient failure.
//!
//! Retrying a whole scan is safe because the controller persists each
//! page's cursor before processing it: the next attempt resumes from the
//! last persisted cursor instead of re-fetching finished pages.

mod retry;

pub use retry::{
    DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error,
    classify_fetch_error, parse_retry_after,
};

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::fetch::ScanRequest;
use crate::remediation::RemediationError;
use crate::scan::{ScanController, ScanError, ScanReport};

/// Runs scans through a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    policy: RetryPolicy,
}

impl Supervisor {
    /// Creates a supervisor with `policy`.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `controller` until a scan succeeds, fails permanently, exhausts
    /// its attempts, or `cancel` fires while waiting to retry.
    ///
    /// A 429 `Retry-After` header replaces the computed backoff delay, but
    /// the wait before a retry is never shorter than the controller's page
    /// delay. Record failures from failed attempts are carried into the
    /// returned report or error. Cancellation during a backoff returns the
    /// last attempt's report marked cancelled.
    ///
    /// # Errors
    ///
    /// Returns the last [`ScanError`] when no further attempt is made.
    #[instrument(skip_all, fields(max_attempts = self.policy.max_attempts()))]
    pub async fn run(
        &self,
        controller: &ScanController,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let mut carried: Vec<RemediationError> = Vec::new();
        let mut attempt = 1;
        loop {
            let mut error = match controller.run_scan(request, cancel).await {
                Ok(mut report) => {
                    prepend_failures(&mut report, carried);
                    return Ok(report);
                }
                Err(error) => error,
            };
            carried.append(&mut error.report_mut().failures);

            let failure_type = classify_error(&error);
            let delay = match self.policy.should_retry(failure_type, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    attempt = next;
                    server_requested_delay(&error)
                        .unwrap_or(delay)
                        .max(controller.options().page_delay)
                }
                RetryDecision::DoNotRetry { reason } => {
                    info!(%reason, ?failure_type, "not retrying scan");
                    error.report_mut().failures = carried;
                    return Err(error);
                }
            };

            warn!(
                error = %error,
                attempt,
                delay_ms = delay.as_millis(),
                "Scan failed; retrying from last persisted cursor"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => {
                    info!("cancellation requested during retry backoff");
                    let mut report = take_report(error);
                    report.failures = carried;
                    report.cancel();
                    return Ok(report);
                }
            }
        }
    }
}

fn prepend_failures(report: &mut ScanReport, mut carried: Vec<RemediationError>) {
    if carried.is_empty() {
        return;
    }
    carried.append(&mut report.failures);
    report.failures = carried;
}

fn take_report(error: ScanError) -> ScanReport {
    match error {
        ScanError::Fetch { report, .. }
        | ScanError::CursorLoad { report, .. }
        | ScanError::CursorSave { report, .. } => *report,
    }
}

fn server_requested_delay(error: &ScanError) -> Option<std::time::Duration> {
    error
        .fetch_error()
        .and_then(|fetch| fetch.retry_after())
        .and_then(parse_retry_after)
}
