//! HTTP client for the leaked-cookie search endpoint.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use tracing::{debug, instrument, warn};
use url::Url;

use super::pager::SearchResponse;
use super::{FetchError, Page, PageSource, SearchQuery};
use crate::config::{ApiConfig, ApiKey};
use crate::user_agent;

/// Search path, relative to the API base URL.
pub const SEARCH_PATH: &str = "leaksdb/v2/cookies/_search";

/// Header carrying the optional tenant identifier.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Issues `POST /leaksdb/v2/cookies/_search` requests.
///
/// One call to [`PageSource::fetch_page`] is one HTTP request; there are no
/// retries here. Timeouts come from [`ApiConfig`].
pub struct SearchClient {
    client: Client,
    search_url: Url,
    api_key: ApiKey,
    tenant_id: Option<u64>,
}

impl SearchClient {
    /// Builds a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for a malformed base URL and
    /// [`FetchError::ClientBuild`] if the HTTP client cannot be constructed.
    #[instrument(skip_all, fields(base_url = %config.base_url, tenant_id = ?config.tenant_id))]
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let search_url = search_endpoint(&config.base_url)?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;

        debug!(search_url = %search_url, "search client ready");
        Ok(Self {
            client,
            search_url,
            api_key: config.api_key.clone(),
            tenant_id: config.tenant_id,
        })
    }

    /// Returns the fully-resolved search endpoint.
    #[must_use]
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("search_url", &self.search_url.as_str())
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PageSource for SearchClient {
    #[instrument(skip_all, fields(from = ?query.from))]
    async fn fetch_page(&self, query: &SearchQuery) -> Result<Page, FetchError> {
        let url = self.search_url.as_str();

        let mut request = self
            .client
            .post(self.search_url.clone())
            .bearer_auth(self.api_key.expose())
            .json(query);
        if let Some(tenant_id) = self.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            warn!(status = status.as_u16(), ?retry_after, "search request rejected");
            return Err(FetchError::http_status_with_retry_after(
                url,
                status.as_u16(),
                retry_after,
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let decoded: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::decode(url, e))?;
        let page = Page::from(decoded);

        debug!(
            items = page.items.len(),
            has_next = page.next.is_some(),
            "search page received"
        );
        Ok(page)
    }
}

/// Resolves the search endpoint beneath `base_url`, keeping any base path.
fn search_endpoint(base_url: &str) -> Result<Url, FetchError> {
    let mut base = Url::parse(base_url.trim()).map_err(|_| FetchError::invalid_url(base_url))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(base_url));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(SEARCH_PATH)
        .map_err(|_| FetchError::invalid_url(base_url))
}
