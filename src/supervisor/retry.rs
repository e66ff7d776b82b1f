//! Retry policy with exponential backoff for whole-scan retries.
//!
//! A failed scan is classified into a [`FailureType`]; the [`RetryPolicy`]
//! decides whether to run the scan again and how long to wait first.
//!
//! # Example
//!
//! ```
//! use cookie_monitor::fetch::FetchError;
//! use cookie_monitor::scan::ScanError;
//! use cookie_monitor::supervisor::{RetryDecision, RetryPolicy, classify_error};
//!
//! let policy = RetryPolicy::with_max_attempts(3);
//! let error = ScanError::Fetch {
//!     page: 1,
//!     source: FetchError::http_status("https://api.example.com/_search", 503),
//!     report: Box::default(),
//! };
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::fetch::FetchError;
use crate::scan::ScanError;

/// Default maximum scan attempts (no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Maximum Retry-After value (1 hour) to prevent excessive delays.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Classification of scan failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: request timeout, 5xx server errors, connection refused.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: 400 Bad Request, malformed response, cursor store errors.
    Permanent,

    /// The API key was rejected (401/403).
    NeedsAuth,

    /// Server rate limiting (HTTP 429).
    RateLimited,
}

/// Decision on whether to retry a failed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Run the scan again after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Give up.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` includes the initial attempt and is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::NeedsAuth => {
                return RetryDecision::DoNotRetry {
                    reason: "API key rejected - check KHULNASOFT_API_KEY".to_string(),
                };
            }
            FailureType::Transient | FailureType::RateLimited => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + jitter()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn jitter() -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=MAX_JITTER.as_millis() as u64))
}

/// Classifies a scan error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Fetch timeout / network | Transient (TLS errors Permanent) |
/// | HTTP 408, 5xx | Transient |
/// | HTTP 429 | RateLimited |
/// | HTTP 401, 403 | NeedsAuth |
/// | Other 4xx, decode, invalid URL | Permanent |
/// | Cursor load/save | Permanent |
#[instrument(skip_all)]
pub fn classify_error(error: &ScanError) -> FailureType {
    match error {
        ScanError::Fetch { source, .. } => classify_fetch_error(source),
        ScanError::CursorLoad { .. } | ScanError::CursorSave { .. } => FailureType::Permanent,
    }
}

/// Classifies a single page fetch failure.
#[must_use]
pub fn classify_fetch_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::HttpStatus { status, .. } => classify_http_status(*status),
        FetchError::Timeout { .. } => FailureType::Transient,
        FetchError::Network { source, .. } => {
            if is_tls_error(source) {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }
        FetchError::Decode { .. } | FetchError::InvalidUrl { .. } | FetchError::ClientBuild { .. } => {
            FailureType::Permanent
        }
    }
}

#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> FailureType {
    match status {
        401 | 403 => FailureType::NeedsAuth,
        408 => FailureType::Transient,
        429 => FailureType::RateLimited,
        status if (400..500).contains(&status) => FailureType::Permanent,
        status if (500..600).contains(&status) => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}

/// Parses a `Retry-After` header value (delta-seconds or HTTP-date).
///
/// Values above one hour are capped; negative or past values yield `None`.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        if seconds < 0 {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let duration = Duration::from_secs(seconds as u64);
        return Some(cap_retry_after(duration));
    }

    let datetime = httpdate::parse_http_date(header_value).ok()?;
    match datetime.duration_since(std::time::SystemTime::now()) {
        Ok(duration) => Some(cap_retry_after(duration)),
        Err(_) => {
            debug!(header_value, "Retry-After date is in the past, ignoring");
            None
        }
    }
}

fn cap_retry_after(duration: Duration) -> Duration {
    if duration > MAX_RETRY_AFTER {
        warn!(
            delay_secs = duration.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping at 1 hour"
        );
        MAX_RETRY_AFTER
    } else {
        duration
    }
}
