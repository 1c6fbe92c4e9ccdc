//! HTML extraction for Google Scholar pages.
//!
//! The site's markup changes without notice, so every extractor here returns a
//! [`ScrapeResult`] per field and tries fallback selectors where the page has
//! had more than one layout. Callers decide what a missing field becomes.

pub mod profile;
pub mod publication;
pub mod search;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{ClientError, ClientResult, ScrapeError, ScrapeResult};

/// Parse a selector written in this crate.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

/// Visible text of an element with whitespace collapsed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Text of the first element matched by the first selector that matches anything.
pub fn first_text(scope: ElementRef<'_>, selectors: &[(&str, &Selector)]) -> ScrapeResult<String> {
    for (css, sel) in selectors {
        if let Some(element) = scope.select(sel).next() {
            return Ok(element_text(element));
        }
        tracing::debug!(selector = css, "Selector matched nothing, trying fallback");
    }
    let tried = selectors.iter().map(|(css, _)| *css).collect::<Vec<_>>().join(" | ");
    Err(ScrapeError::missing(tried))
}

/// Resolve a link found on a page against the site root.
pub fn resolve_url(base: &str, href: &str) -> ClientResult<String> {
    let invalid = |source| ClientError::InvalidUrl { url: href.to_string(), source };
    let base = Url::parse(base).map_err(invalid)?;
    base.join(href).map(String::from).map_err(invalid)
}
