//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

use cookie_monitor::config::{
    DEFAULT_BASE_URL, DEFAULT_COOKIE_NAME, DEFAULT_DOMAIN, DEFAULT_IMPORT_WINDOW_DAYS,
};
use cookie_monitor::cursor::DEFAULT_CURSOR_FILE;

/// Scan leaked-cookie records and invalidate still-valid sessions.
///
/// Each run resumes from the cursor file, pages through matching leaked
/// cookies, and hands every still-valid cookie to the remediator.
#[derive(Parser)]
#[command(name = "cookie-monitor")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// API key for the leaked-data search API
    #[arg(long, env = "KHULNASOFT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Tenant identifier the API key acts for
    #[arg(long, env = "KHULNASOFT_TENANT_ID")]
    pub tenant_id: Option<u64>,

    /// Search API base URL
    #[arg(long, env = "KHULNASOFT_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Cookie domain to monitor
    #[arg(long, env = "KHULNASOFT_COOKIE_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Cookie name to monitor
    #[arg(long, env = "KHULNASOFT_COOKIE_NAME", default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// File holding the resume cursor
    #[arg(long, default_value = DEFAULT_CURSOR_FILE)]
    pub cursor_file: PathBuf,

    /// Include cookies that have already expired
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub include_expired: bool,

    /// Only scan records imported within this many days (0 to disable, max 3650)
    #[arg(long, default_value_t = DEFAULT_IMPORT_WINDOW_DAYS, value_parser = clap::value_parser!(u32).range(0..=3650))]
    pub imported_within_days: u32,

    /// Delay after each page fetch in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub page_delay_ms: u64,

    /// Per-request timeout in seconds (1-3600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub request_timeout_secs: u64,

    /// Maximum scan attempts on transient API failures (1-10)
    #[arg(short = 'r', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Treat an unreadable cursor file as start of stream instead of failing
    #[arg(long)]
    pub tolerate_cursor_errors: bool,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("api_key", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .field("base_url", &self.base_url)
            .field("domain", &self.domain)
            .field("cookie_name", &self.cookie_name)
            .field("cursor_file", &self.cursor_file)
            .field("include_expired", &self.include_expired)
            .field("imported_within_days", &self.imported_within_days)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("tolerate_cursor_errors", &self.tolerate_cursor_errors)
            .finish()
    }
}
