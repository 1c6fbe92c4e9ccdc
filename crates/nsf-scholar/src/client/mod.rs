//! Google Scholar page client.
//!
//! Provides an async HTTP client with:
//! - Browser-like headers and a per-session cookie store
//! - Retry middleware with exponential backoff
//! - A fixed delay before every page load
//! - Captcha/block detection

mod session;

pub use session::{Browser, ClientLauncher, Launcher, RecyclePolicy, Session};

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, scholar};
use crate::error::{ClientError, ClientResult};

/// Markers the site puts on its anti-automation interstitial.
const CAPTCHA_MARKERS: &[&str] = &["id=\"gs_captcha_f\"", "id=\"gs_captcha_ccl\"", "id=\"captcha-form\""];

/// HTTP client for scholar pages.
///
/// Each instance owns its own cookie jar, so dropping it and building a new one
/// is the equivalent of restarting a browser.
#[derive(Clone)]
pub struct ScholarClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Site root, without trailing slash.
    base_url: String,

    /// Delay before each page load.
    page_delay: Duration,

    /// Request timeout, reported on time-outs.
    request_timeout: Duration,
}

impl ScholarClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(scholar::USER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .cookie_store(true)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.scholar_url.clone(),
            page_delay: config.page_delay,
            request_timeout: config.request_timeout,
        })
    }

    /// Make a GET request and return the page body.
    async fn get(&self, url: &str) -> ClientResult<String> {
        // Let the previous page settle before navigating again
        tokio::time::sleep(self.page_delay).await;

        let response = self.client.get(url).send().await.map_err(|err| match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                ClientError::Timeout(self.request_timeout)
            }
            other => ClientError::from(other),
        })?;

        let response = self.handle_response(response).await?;
        let final_path = response.url().path().to_string();
        let body = response.text().await?;

        if final_path.starts_with("/sorry") || CAPTCHA_MARKERS.iter().any(|m| body.contains(m)) {
            return Err(ClientError::blocked(url));
        }

        Ok(body)
    }

    /// Handle response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            403 => Err(ClientError::blocked(response.url().as_str())),
            404 => Err(ClientError::not_found(response.url().as_str())),
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

#[async_trait::async_trait]
impl Browser for ScholarClient {
    async fn open(&self, url: &str) -> ClientResult<String> {
        tracing::debug!(url, "Opening page");
        self.get(url).await
    }
}

impl std::fmt::Debug for ScholarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScholarClient").field("base_url", &self.base_url).finish()
    }
}
