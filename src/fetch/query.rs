//! Search query construction.
//!
//! A [`SearchQuery`] is built once per scan from the loaded cursor and the
//! scan filters; the pager then rewrites only its `from` field as it follows
//! continuation tokens.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::record::Cursor;

/// Maximum number of records requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Which cookies a scan is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilters {
    /// Cookie domain to search for.
    pub domain: String,
    /// Cookie name to search for.
    pub cookie_name: String,
}

impl ScanFilters {
    /// Creates filters for a single domain/name pair.
    #[must_use]
    pub fn new(domain: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

/// Per-run scan parameters chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Domain/name filter.
    pub filters: ScanFilters,
    /// When false, only cookies expiring after "now" are requested.
    pub include_expired: bool,
    /// When set, only records imported within this window are requested.
    pub min_import_age: Option<TimeDelta>,
}

impl ScanRequest {
    /// Creates a request that includes expired cookies and has no import window.
    #[must_use]
    pub fn new(filters: ScanFilters) -> Self {
        Self {
            filters,
            include_expired: true,
            min_import_age: None,
        }
    }

    /// Sets whether expired cookies are included.
    #[must_use]
    pub fn include_expired(mut self, include_expired: bool) -> Self {
        self.include_expired = include_expired;
        self
    }

    /// Restricts the scan to records imported within `age` of now.
    #[must_use]
    pub fn imported_within(mut self, age: TimeDelta) -> Self {
        self.min_import_age = Some(age);
        self
    }
}

/// JSON body of a `_search` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Resume point; `null` starts from the beginning of the stream.
    pub from: Option<Cursor>,
    /// Cookie domain filter.
    pub domain: String,
    /// Cookie name filter.
    pub names: Vec<String>,
    /// Page-size bound.
    pub size: u32,
    /// Only cookies expiring after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<DateTime<Utc>>,
    /// Only records imported after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_after: Option<DateTime<Utc>>,
}

impl SearchQuery {
    /// Builds the query for a scan starting at `cursor`, evaluated at `now`.
    #[must_use]
    pub fn build(cursor: Option<Cursor>, request: &ScanRequest, now: DateTime<Utc>) -> Self {
        let expires_after = (!request.include_expired).then_some(now);
        let imported_after = request
            .min_import_age
            .map(|age| now.checked_sub_signed(age).unwrap_or(DateTime::<Utc>::MIN_UTC));

        Self {
            from: cursor,
            domain: request.filters.domain.clone(),
            names: vec![request.filters.cookie_name.clone()],
            size: PAGE_SIZE,
            expires_after,
            imported_after,
        }
    }
}
