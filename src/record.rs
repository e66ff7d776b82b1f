//! Leaked cookie records and the opaque scan cursor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A leaked browser cookie as returned by the search API.
///
/// The value field is redacted in Debug output to prevent accidental
/// logging of live session tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Domain the cookie was issued for (e.g., `scatterholt.com`).
    pub domain: String,
    /// Cookie name (e.g., `session`).
    pub name: String,
    /// URL path scope of the cookie.
    pub path: String,
    value: String,
}

impl CookieRecord {
    /// Creates a new cookie record.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            path: path.into(),
            value: value.into(),
        }
    }

    /// Returns the raw cookie value.
    ///
    /// Only remediation code should need this; never log it.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns a log-safe identity for this record (domain, name, path).
    #[must_use]
    pub fn label(&self) -> RecordLabel {
        RecordLabel {
            domain: self.domain.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
        }
    }
}

impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Value-free identity of a cookie record, safe for logs and run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabel {
    /// Cookie domain.
    pub domain: String,
    /// Cookie name.
    pub name: String,
    /// Cookie path.
    pub path: String,
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({})", self.domain, self.path, self.name)
    }
}

/// Opaque continuation token issued by the search API.
///
/// A cursor marks "resume after the last page fetched". Empty tokens are
/// never constructed; use `Option<Cursor>` for "from the beginning".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a raw token, returning `None` for blank input.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
