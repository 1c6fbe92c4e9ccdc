//! Error types for the NSF → Google Scholar pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! The three enums follow the pipeline's failure taxonomy: HTTP/session failures,
//! per-record scrape failures, and stage-level failures.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the site (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// The site served a captcha or refused the request (403).
    #[error("Blocked by anti-automation check at {url}")]
    Blocked {
        /// Page that was blocked
        url: String,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// A link scraped from a page could not be turned into an absolute URL.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// Offending URL text
        url: String,
        /// Parse failure
        source: url::ParseError,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a blocked error.
    #[must_use]
    pub fn blocked(url: impl Into<String>) -> Self {
        Self::Blocked { url: url.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if the whole scraping session is compromised.
    ///
    /// Session failures abort the current batch iteration so that the caller can
    /// cool down and relaunch; everything else is a per-record failure.
    #[must_use]
    pub const fn is_session_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Middleware(_)
                | Self::RateLimited { .. }
                | Self::Blocked { .. }
                | Self::Timeout(_)
        )
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from scraping a single record or field.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// Page could not be loaded
    #[error("Page load failed: {0}")]
    Client(#[from] ClientError),

    /// None of the selectors matched
    #[error("No element matched '{selector}'")]
    MissingElement {
        /// Selector(s) that were tried
        selector: String,
    },

    /// Element text was not a number
    #[error("Expected a number in {field}, found '{text}'")]
    InvalidNumber {
        /// Field being parsed
        field: &'static str,
        /// Raw text
        text: String,
    },

    /// The author search returned nobody
    #[error("No author candidates for '{query}'")]
    NoCandidates {
        /// Search query
        query: String,
    },

    /// Several candidates, none with the award's email domain
    #[error("{candidates} candidates for '{query}', none verified at {domain}")]
    NoDomainMatch {
        /// Search query
        query: String,
        /// Email domain looked for
        domain: String,
        /// Number of candidates inspected
        candidates: usize,
    },
}

impl ScrapeError {
    /// Create a missing element error.
    #[must_use]
    pub fn missing(selector: impl Into<String>) -> Self {
        Self::MissingElement { selector: selector.into() }
    }

    /// Create an invalid number error.
    #[must_use]
    pub fn invalid_number(field: &'static str, text: impl Into<String>) -> Self {
        Self::InvalidNumber { field, text: text.into() }
    }

    /// Returns the client error if this failure came from a session-level problem.
    #[must_use]
    pub const fn session_failure(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) if err.is_session_failure() => Some(err),
            _ => None,
        }
    }
}

/// Errors that stop a pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A required input table does not exist
    #[error("Input file {} does not exist", path.display())]
    MissingInput {
        /// Expected location
        path: PathBuf,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON column encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed award XML
    #[error("XML error in {}: {message}", path.display())]
    Xml {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

impl PipelineError {
    /// Create a missing input error.
    #[must_use]
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }

    /// Create an XML error.
    #[must_use]
    pub fn xml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Xml { path: path.into(), message: message.into() }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for scrape operations.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Result type alias for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_failures() {
        assert!(ClientError::rate_limited(60).is_session_failure());
        assert!(ClientError::blocked("/citations").is_session_failure());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_session_failure());

        assert!(!ClientError::not_found("/citations?user=x").is_session_failure());
        assert!(!ClientError::server(502, "bad gateway").is_session_failure());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("paper");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_scrape_error_session_failure() {
        let err = ScrapeError::from(ClientError::blocked("/x"));
        assert!(err.session_failure().is_some());

        let err = ScrapeError::missing("#gsc_rsb_st");
        assert!(err.session_failure().is_none());
        assert!(err.to_string().contains("#gsc_rsb_st"));
    }

    #[test]
    fn test_missing_input_message() {
        let err = PipelineError::missing_input("database/funding_info.csv");
        assert!(err.to_string().contains("funding_info.csv"));
    }
}
