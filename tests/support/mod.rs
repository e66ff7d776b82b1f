//! Shared fakes for scan integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use cookie_monitor::fetch::{FetchError, Page, PageSource, SearchQuery};
use cookie_monitor::{CookieRecord, Cursor, RemediationError, Remediator, Verifier};
use tokio::sync::Notify;
use tokio::time::Instant;

/// Builds a cookie whose path doubles as its test identifier.
pub fn cookie(path: &str) -> CookieRecord {
    CookieRecord::new("scatterholt.com", "session", path, format!("value-{path}"))
}

/// Builds a cursor, panicking on blank input.
pub fn cursor(token: &str) -> Cursor {
    Cursor::new(token).expect("non-blank test cursor")
}

/// Simulated search API keyed by the request's `from` token.
///
/// Unknown tokens answer with an empty page, like a server with nothing
/// newer than the cursor.
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<Option<String>, Page>,
    requests: Mutex<Vec<(SearchQuery, Instant)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `next`/`items` for requests starting at `from`.
    pub fn page(mut self, from: Option<&str>, next: Option<&str>, items: &[&str]) -> Self {
        let page = Page::new(
            next.map(cursor),
            items.iter().map(|path| cookie(path)).collect(),
        );
        self.pages.insert(from.map(str::to_string), page);
        self
    }

    /// `from` values of every request, in order.
    pub fn requested_from(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.from.as_ref().map(|c| c.as_str().to_string()))
            .collect()
    }

    /// Full queries of every request, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    /// Instants at which each request was issued.
    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<Page, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.clone(), Instant::now()));
        let key = query.from.as_ref().map(|c| c.as_str().to_string());
        Ok(self
            .pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Page::new(None, Vec::new())))
    }
}

/// Verifier that rejects or errors on fixed sets of paths and records every call.
#[derive(Default)]
pub struct PathVerifier {
    rejected: HashSet<String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl PathVerifier {
    pub fn rejecting(paths: &[&str]) -> Self {
        Self {
            rejected: paths.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Answers with a verification error for `paths`.
    pub fn failing(paths: &[&str]) -> Self {
        Self {
            failing: paths.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Verifier for PathVerifier {
    async fn verify(&self, record: &CookieRecord) -> Result<bool, RemediationError> {
        self.calls.lock().unwrap().push(record.path.clone());
        if self.failing.contains(&record.path) {
            return Err(RemediationError::verify(record, "session lookup timed out"));
        }
        Ok(!self.rejected.contains(&record.path))
    }
}

/// Remediator that records the path of every remediated cookie.
#[derive(Default)]
pub struct RecordingRemediator {
    calls: Mutex<Vec<String>>,
}

impl RecordingRemediator {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remediator for RecordingRemediator {
    async fn remediate(&self, record: &CookieRecord) -> Result<(), RemediationError> {
        self.calls.lock().unwrap().push(record.path.clone());
        Ok(())
    }
}

/// Remediator that hangs forever on one path, standing in for a process crash.
pub struct HangingRemediator {
    hang_on: String,
    pub reached: Notify,
    calls: Mutex<Vec<String>>,
}

impl HangingRemediator {
    pub fn on(path: &str) -> Self {
        Self {
            hang_on: path.to_string(),
            reached: Notify::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remediator for HangingRemediator {
    async fn remediate(&self, record: &CookieRecord) -> Result<(), RemediationError> {
        if record.path == self.hang_on {
            self.reached.notify_one();
            std::future::pending::<()>().await;
        }
        self.calls.lock().unwrap().push(record.path.clone());
        Ok(())
    }
}
