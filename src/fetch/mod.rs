//! Paginated fetching of leaked-cookie search results.
//!
//! # Overview
//!
//! - [`SearchQuery`] - JSON request body built once per scan
//! - [`PageSource`] - one request in, one [`Page`] out
//! - [`SearchClient`] - HTTP implementation of [`PageSource`]
//! - [`Pager`] - lazy, single-pass sequence of pages following `next` tokens
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use cookie_monitor::config::{ApiConfig, ApiKey};
//! use cookie_monitor::fetch::{Pager, ScanFilters, ScanRequest, SearchClient, SearchQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::new(&ApiConfig::new(
//!     "https://api.khulnasoft.com",
//!     ApiKey::new("key"),
//! ))?;
//! let request = ScanRequest::new(ScanFilters::new("scatterholt.com", "session"));
//! let mut pager = Pager::new(&client, SearchQuery::build(None, &request, Utc::now()));
//! while let Some(page) = pager.next_page().await? {
//!     println!("fetched {} cookies", page.items.len());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod pager;
mod query;

pub use client::{SEARCH_PATH, SearchClient, TENANT_HEADER};
pub use error::FetchError;
pub use pager::{Page, PageSource, Pager};
pub use query::{PAGE_SIZE, ScanFilters, ScanRequest, SearchQuery};
