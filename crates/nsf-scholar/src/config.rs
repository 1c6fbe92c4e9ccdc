//! Configuration for the NSF → Google Scholar pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::RecyclePolicy;
use crate::error::ClientError;

/// Scraping configuration constants.
pub mod scholar {
    use std::time::Duration;

    /// Base URL for Google Scholar.
    pub const BASE_URL: &str = "https://scholar.google.com";

    /// Author search and profile path.
    pub const CITATIONS_PATH: &str = "/citations";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Wait before every page load (the site throttles rapid navigation).
    pub const PAGE_DELAY: Duration = Duration::from_secs(3);

    /// Pause between publication detail pages.
    pub const ROW_DELAY: Duration = Duration::from_secs(2);

    /// Cooldown after a session failure or a scheduled recycle.
    pub const COOLDOWN: Duration = Duration::from_secs(20);

    /// Transient HTTP retries per request.
    pub const MAX_RETRIES: u32 = 3;

    /// Consecutive session failures tolerated by the author resolver.
    pub const MAX_SESSION_FAILURES: u32 = 5;

    /// Publication detail rows between checkpoints.
    pub const CHECKPOINT_EVERY: usize = 50;

    /// Publication detail rows between session recycles.
    pub const DETAIL_RECYCLE_EVERY: usize = 50;

    /// Authors between session recycles during URL discovery.
    pub const DISCOVERY_RECYCLE_EVERY: usize = 1;

    /// Publications are kept within this many years of the award year.
    pub const YEAR_WINDOW: i32 = 3;

    /// Rows requested per "load more" page of a profile.
    pub const PAGE_SIZE: usize = 100;

    /// Browser-like user agent.
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scholar site (for testing with mock servers).
    pub scholar_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay before every page load.
    pub page_delay: Duration,

    /// Delay between publication detail rows.
    pub row_delay: Duration,

    /// Cooldown after session failures and scheduled recycles.
    pub cooldown: Duration,

    /// Transient retries per request.
    pub max_retries: u32,

    /// Consecutive session failures before the author resolver gives up.
    pub max_session_failures: u32,

    /// Detail rows between checkpoints.
    pub checkpoint_every: usize,

    /// Detail rows between session recycles.
    pub detail_recycle_every: usize,

    /// Authors between session recycles during URL discovery.
    pub discovery_recycle_every: usize,

    /// Publication year window around the award year.
    pub year_window: i32,

    /// Rows per profile page.
    pub page_size: usize,
}

impl Config {
    /// Create a configuration pointing at the given scholar site.
    #[must_use]
    pub fn new(scholar_url: Option<String>) -> Self {
        Self {
            scholar_url: scholar_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| scholar::BASE_URL.to_string()),
            request_timeout: scholar::REQUEST_TIMEOUT,
            connect_timeout: scholar::CONNECT_TIMEOUT,
            page_delay: scholar::PAGE_DELAY,
            row_delay: scholar::ROW_DELAY,
            cooldown: scholar::COOLDOWN,
            max_retries: scholar::MAX_RETRIES,
            max_session_failures: scholar::MAX_SESSION_FAILURES,
            checkpoint_every: scholar::CHECKPOINT_EVERY,
            detail_recycle_every: scholar::DETAIL_RECYCLE_EVERY,
            discovery_recycle_every: scholar::DISCOVERY_RECYCLE_EVERY,
            year_window: scholar::YEAR_WINDOW,
            page_size: scholar::PAGE_SIZE,
        }
    }

    /// Create a test configuration with a custom URL for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            page_delay: Duration::ZERO, // No delays in tests
            row_delay: Duration::ZERO,
            cooldown: Duration::ZERO,
            max_retries: 0,
            max_session_failures: 2,
            ..Self::new(Some(base_url.to_string()))
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("SCHOLAR_BASE_URL").ok());
        if let Ok(ms) = std::env::var("NSF_SCHOLAR_PAGE_DELAY_MS") {
            config.page_delay = Duration::from_millis(ms.parse()?);
        }
        Ok(config)
    }

    /// URL of the author search page root.
    #[must_use]
    pub fn citations_url(&self) -> String {
        format!("{}{}", self.scholar_url, scholar::CITATIONS_PATH)
    }

    /// Inclusive publication year range for an award year.
    #[must_use]
    pub const fn window(&self, award_year: i32) -> (i32, i32) {
        (award_year - self.year_window, award_year + self.year_window)
    }

    /// Pause before relaunching after a session failure.
    ///
    /// The configured cooldown, or the site's `Retry-After` if that is longer.
    #[must_use]
    pub fn cooldown_after(&self, error: &ClientError) -> Duration {
        error.retry_after().map_or(self.cooldown, |wait| wait.max(self.cooldown))
    }

    /// Recycle policy for URL discovery (one author per session).
    #[must_use]
    pub const fn discovery_policy(&self) -> RecyclePolicy {
        RecyclePolicy::new(self.discovery_recycle_every, Duration::ZERO)
    }

    /// Recycle policy for publication detail enrichment.
    #[must_use]
    pub const fn detail_policy(&self) -> RecyclePolicy {
        RecyclePolicy::new(self.detail_recycle_every, self.cooldown)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Locations of every table the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Create paths rooted at a database directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Award table written by the extractor.
    #[must_use]
    pub fn funding_info(&self) -> PathBuf {
        self.root.join("funding_info.csv")
    }

    /// Author table for an award year.
    #[must_use]
    pub fn author_info(&self, year: i32) -> PathBuf {
        self.root.join("author_info").join(format!("author_info_{year}.csv"))
    }

    /// Pass-1 publication URL table, named by its year window.
    #[must_use]
    pub fn pub_url(&self, year: i32, window: i32) -> PathBuf {
        self.publication_dir().join(format!("pub_url_{}_{}.csv", year - window, year + window))
    }

    /// Pass-2 checkpoint.
    #[must_use]
    pub fn pub_info_checkpoint(&self, year: i32) -> PathBuf {
        self.publication_dir().join(format!("pub_info_{year}.partial.csv"))
    }

    /// Final publication table.
    #[must_use]
    pub fn pub_info(&self, year: i32) -> PathBuf {
        self.publication_dir().join(format!("pub_info_{year}.csv"))
    }

    fn publication_dir(&self) -> PathBuf {
        self.root.join("publication_info")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new("database")
    }
}
