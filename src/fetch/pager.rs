//! Lazy, single-pass pagination over the cookie search endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{FetchError, SearchQuery};
use crate::record::{CookieRecord, Cursor};

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Continuation token for the following page; `None` ends the stream.
    pub next: Option<Cursor>,
    /// Records in server order.
    pub items: Vec<CookieRecord>,
}

impl Page {
    /// Creates a page.
    #[must_use]
    pub fn new(next: Option<Cursor>, items: Vec<CookieRecord>) -> Self {
        Self { next, items }
    }
}

/// Wire shape of a `_search` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub items: Vec<CookieRecord>,
}

impl From<SearchResponse> for Page {
    fn from(response: SearchResponse) -> Self {
        Self {
            next: response.next.and_then(Cursor::new),
            items: response.items,
        }
    }
}

/// Anything that can answer a single search request with a single page.
///
/// [`SearchClient`](super::SearchClient) is the HTTP implementation; tests
/// substitute scripted sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Performs exactly one request for `query`.
    async fn fetch_page(&self, query: &SearchQuery) -> Result<Page, FetchError>;
}

/// Follows continuation tokens one request at a time.
///
/// No request is issued until [`Pager::next_page`] is awaited, so callers can
/// persist cursors and throttle between pages. The stream ends after a page
/// whose `next` is `None`, on an empty page (not yielded), or after the first
/// error. It is never restarted.
pub struct Pager<'a> {
    source: &'a dyn PageSource,
    query: SearchQuery,
    finished: bool,
    requests: usize,
}

impl<'a> Pager<'a> {
    /// Creates a pager starting at `query.from`.
    #[must_use]
    pub fn new(source: &'a dyn PageSource, query: SearchQuery) -> Self {
        Self {
            source,
            query,
            finished: false,
            requests: 0,
        }
    }

    /// Fetches the next page, or returns `Ok(None)` once the stream is done.
    ///
    /// # Errors
    ///
    /// Returns the source's [`FetchError`] unchanged; the pager is finished
    /// afterwards.
    #[instrument(skip(self), fields(request = self.requests + 1, from = ?self.query.from))]
    pub async fn next_page(&mut self) -> Result<Option<Page>, FetchError> {
        if self.finished {
            return Ok(None);
        }

        self.requests += 1;
        let page = match self.source.fetch_page(&self.query).await {
            Ok(page) => page,
            Err(error) => {
                self.finished = true;
                return Err(error);
            }
        };

        if page.items.is_empty() {
            debug!("empty page, end of stream");
            self.finished = true;
            return Ok(None);
        }

        match &page.next {
            Some(next) => self.query.from = Some(next.clone()),
            None => {
                debug!("no continuation token, last page");
                self.finished = true;
            }
        }

        Ok(Some(page))
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Returns true once no further requests will be made.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl std::fmt::Debug for Pager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("from", &self.query.from)
            .field("finished", &self.finished)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}
