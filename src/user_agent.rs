//! Shared User-Agent string for search API requests.

/// Default User-Agent for search requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("cookie-monitor/{version} (leaked-session-remediation)")
}
