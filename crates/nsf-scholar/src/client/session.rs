//! Scraping sessions with an explicit recycle policy.
//!
//! A [`Session`] owns one live [`Browser`] at a time. Stages call
//! [`Session::complete`] after each unit of work; once the policy says the
//! session is stale the browser is dropped, the session cools down, and the next
//! page load launches a fresh one.

use std::time::Duration;

use tracing::{debug, info};

use super::ScholarClient;
use crate::config::Config;
use crate::error::ClientResult;

/// Something that can load pages.
#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    /// Load a page and return its HTML.
    async fn open(&self, url: &str) -> ClientResult<String>;
}

/// Starts new browsers.
pub trait Launcher: Send + Sync {
    /// Browser type produced.
    type Browser: Browser;

    /// Start a fresh browser.
    fn launch(&self) -> ClientResult<Self::Browser>;
}

/// Launches [`ScholarClient`]s from a configuration.
#[derive(Debug, Clone)]
pub struct ClientLauncher {
    config: Config,
}

impl ClientLauncher {
    /// Create a launcher.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Launcher for ClientLauncher {
    type Browser = ScholarClient;

    fn launch(&self) -> ClientResult<ScholarClient> {
        ScholarClient::new(&self.config)
    }
}

/// When to throw a browser away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecyclePolicy {
    /// Operations per browser; 0 disables scheduled recycling.
    pub every: usize,

    /// Pause after a scheduled recycle.
    pub cooldown: Duration,
}

impl RecyclePolicy {
    /// Recycle after `every` operations, pausing `cooldown` each time.
    #[must_use]
    pub const fn new(every: usize, cooldown: Duration) -> Self {
        Self { every, cooldown }
    }

    /// Never recycle on a schedule.
    #[must_use]
    pub const fn never() -> Self {
        Self { every: 0, cooldown: Duration::ZERO }
    }

    /// Whether a browser that has done `operations` units of work is due.
    #[must_use]
    pub const fn is_due(&self, operations: usize) -> bool {
        self.every > 0 && operations > 0 && operations % self.every == 0
    }
}

/// An owned scraping session.
pub struct Session<L: Launcher> {
    launcher: L,
    browser: Option<L::Browser>,
    policy: RecyclePolicy,
    operations: usize,
    launches: usize,
}

impl<L: Launcher> Session<L> {
    /// Create a session. No browser is started until the first page load.
    #[must_use]
    pub fn new(launcher: L, policy: RecyclePolicy) -> Self {
        Self { launcher, browser: None, policy, operations: 0, launches: 0 }
    }

    /// Load a page, launching a browser if none is live.
    pub async fn open(&mut self, url: &str) -> ClientResult<String> {
        let browser = self.browser()?;
        browser.open(url).await
    }

    /// Record one finished unit of work and recycle if the policy says so.
    pub async fn complete(&mut self) {
        self.operations += 1;
        if self.policy.is_due(self.operations) {
            info!(
                operations = self.operations,
                cooldown = ?self.policy.cooldown,
                "Recycling scraping session"
            );
            self.restart(self.policy.cooldown).await;
        }
    }

    /// Drop the live browser and wait before the next launch.
    pub async fn restart(&mut self, cooldown: Duration) {
        self.close();
        if !cooldown.is_zero() {
            tokio::time::sleep(cooldown).await;
        }
    }

    /// Drop the live browser, if any.
    pub fn close(&mut self) {
        if self.browser.take().is_some() {
            debug!(launches = self.launches, "Closed browser");
        }
    }

    /// Units of work completed so far.
    #[must_use]
    pub const fn operations(&self) -> usize {
        self.operations
    }

    /// Browsers launched so far.
    #[must_use]
    pub const fn launches(&self) -> usize {
        self.launches
    }

    /// Whether a browser is currently live.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.browser.is_some()
    }

    fn browser(&mut self) -> ClientResult<&L::Browser> {
        let browser = match self.browser.take() {
            Some(browser) => browser,
            None => {
                let browser = self.launcher.launch()?;
                self.launches += 1;
                debug!(launches = self.launches, "Launched browser");
                browser
            }
        };
        Ok(self.browser.insert(browser))
    }
}

impl<L: Launcher> std::fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("policy", &self.policy)
            .field("operations", &self.operations)
            .field("launches", &self.launches)
            .field("live", &self.is_live())
            .finish()
    }
}
