//! Cookie Monitor Library
//!
//! Scans a leaked-cookie search API for cookies matching a domain/name
//! filter and remediates each still-valid cookie, resuming across restarts
//! from a durable cursor.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`record`] - Cookie records and the opaque scan cursor
//! - [`fetch`] - Search queries, the HTTP client, and lazy pagination
//! - [`cursor`] - Durable cursor storage (file and in-memory)
//! - [`remediation`] - Injected verify/remediate capabilities
//! - [`scan`] - The resumable scan-and-remediate controller
//! - [`supervisor`] - Whole-scan retries with backoff
//! - [`config`] - Explicit configuration passed in by the binary

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cursor;
pub mod fetch;
pub mod record;
pub mod remediation;
pub mod scan;
pub mod supervisor;
mod user_agent;

// Re-export commonly used types
pub use config::{ApiConfig, ApiKey, ConfigError, ScanOptions};
pub use cursor::{CursorStore, FileCursorStore, MemoryCursorStore, StoreError};
pub use fetch::{FetchError, Page, PageSource, Pager, ScanFilters, ScanRequest, SearchClient};
pub use record::{CookieRecord, Cursor, RecordLabel};
pub use remediation::{
    LoggingRemediator, LoggingVerifier, RemediationError, Remediator, Verifier,
};
pub use scan::{ScanController, ScanError, ScanOutcome, ScanReport, ScanState};
pub use supervisor::{RetryPolicy, Supervisor};
