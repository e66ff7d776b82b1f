//! Explicit configuration structures passed into the core.
//!
//! Nothing in the library reads the environment; the binary resolves flags
//! and environment variables into these structures and validates them once.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default search API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.khulnasoft.com";

/// Default cookie domain to monitor.
pub const DEFAULT_DOMAIN: &str = "scatterholt.com";

/// Default cookie name to monitor.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Default fixed delay applied after each page fetch.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for the inter-page delay.
pub const MAX_PAGE_DELAY: Duration = Duration::from_secs(60);

/// Default per-request timeout for search calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout for search calls.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default import window for the reference invocation.
pub const DEFAULT_IMPORT_WINDOW_DAYS: u32 = 90;

/// Errors raised while validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key is empty.
    #[error("API key is empty\n  Suggestion: set KHULNASOFT_API_KEY or pass --api-key")]
    MissingApiKey,

    /// A value is outside its accepted range.
    #[error("invalid config value for `{field}`: {value}. Expected: {expected}")]
    InvalidValue {
        /// Config field name.
        field: &'static str,
        /// Offending value, rendered for display.
        value: String,
        /// Accepted range or format.
        expected: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl fmt::Display, expected: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// API credential, redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for the Authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Connection settings for the search API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; the search path is appended to it.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: ApiKey,
    /// Optional tenant the key acts on behalf of.
    pub tenant_id: Option<u64>,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout; expiry surfaces as a fetch timeout.
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Creates a config with default timeouts and no tenant.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            tenant_id: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Validates the credential and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty key or out-of-range timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.expose().trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid(
                "base_url",
                "<empty>",
                "an http(s) URL",
            ));
        }
        validate_timeout("connect_timeout", self.connect_timeout)?;
        validate_timeout("request_timeout", self.request_timeout)?;
        Ok(())
    }
}

fn validate_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    let secs = value.as_secs();
    if !(1..=3600).contains(&secs) {
        return Err(ConfigError::invalid(field, format!("{secs}s"), "1..=3600 seconds"));
    }
    Ok(())
}

/// Controller behavior that is independent of what is being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Fixed delay after each page fetch, before its records are processed.
    pub page_delay: Duration,
    /// Treat an unreadable cursor as start-of-stream instead of failing.
    pub tolerate_cursor_load_errors: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
            tolerate_cursor_load_errors: false,
        }
    }
}

impl ScanOptions {
    /// Validates the page delay bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the delay exceeds [`MAX_PAGE_DELAY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_delay > MAX_PAGE_DELAY {
            return Err(ConfigError::invalid(
                "page_delay",
                format!("{}ms", self.page_delay.as_millis()),
                "0..=60000 milliseconds",
            ));
        }
        Ok(())
    }
}
