//! Injected per-record capabilities: verification and remediation.
//!
//! The scan controller asks a [`Verifier`] whether a leaked cookie is still
//! actionable, then hands actionable cookies to a [`Remediator`]. Fetching
//! is at-least-once, so remediators must tolerate records that were already
//! invalidated.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::record::{CookieRecord, RecordLabel};

/// Failure acting on a single record. Never aborts a scan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemediationError {
    /// The verifier could not decide.
    #[error("verification failed for {record}: {reason}")]
    Verify {
        /// Value-free identity of the record.
        record: RecordLabel,
        /// Why verification failed.
        reason: String,
    },

    /// The remediation side effect failed.
    #[error("remediation failed for {record}: {reason}")]
    Remediate {
        /// Value-free identity of the record.
        record: RecordLabel,
        /// Why remediation failed.
        reason: String,
    },
}

impl RemediationError {
    /// Creates a verification error.
    pub fn verify(record: &CookieRecord, reason: impl Into<String>) -> Self {
        Self::Verify {
            record: record.label(),
            reason: reason.into(),
        }
    }

    /// Creates a remediation error.
    pub fn remediate(record: &CookieRecord, reason: impl Into<String>) -> Self {
        Self::Remediate {
            record: record.label(),
            reason: reason.into(),
        }
    }

    /// Returns the identity of the record that failed.
    #[must_use]
    pub fn record(&self) -> &RecordLabel {
        match self {
            Self::Verify { record, .. } | Self::Remediate { record, .. } => record,
        }
    }
}

/// Decides whether a leaked cookie is still actionable.
///
/// Must not modify the leaked-data store; may probe the target site.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Returns `Ok(false)` for cookies that are expired or already invalidated.
    async fn verify(&self, record: &CookieRecord) -> Result<bool, RemediationError>;
}

/// Performs the corrective side effect (e.g., force session invalidation).
#[async_trait]
pub trait Remediator: Send + Sync {
    /// Invalidates the cookie. Must be a no-op on an already-invalidated cookie.
    async fn remediate(&self, record: &CookieRecord) -> Result<(), RemediationError>;
}

/// Dry-run verifier: logs and treats every cookie as actionable.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingVerifier;

#[async_trait]
impl Verifier for LoggingVerifier {
    async fn verify(&self, record: &CookieRecord) -> Result<bool, RemediationError> {
        info!(cookie = %record.label(), "would verify cookie");
        Ok(true)
    }
}

/// Dry-run remediator: logs the cookie that would be invalidated.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRemediator;

#[async_trait]
impl Remediator for LoggingRemediator {
    async fn remediate(&self, record: &CookieRecord) -> Result<(), RemediationError> {
        info!(cookie = %record.label(), "would invalidate cookie");
        Ok(())
    }
}
