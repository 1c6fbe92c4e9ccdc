//! Author search results and email-domain disambiguation.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, selector};
use crate::error::{ClientError, ClientResult, ScrapeError, ScrapeResult};

static CANDIDATE: LazyLock<Selector> = LazyLock::new(|| selector("div.gs_ai.gs_scl.gs_ai_chpr"));
static PHOTO_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.gs_ai_pho"));
static NAME_LINK: LazyLock<Selector> = LazyLock::new(|| selector("h3.gs_ai_name a"));
static EMAIL: LazyLock<Selector> = LazyLock::new(|| selector("div.gs_ai_eml"));

static VERIFIED_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Verified email at\s+([A-Za-z0-9.-]+)").expect("static regex is valid")
});

/// One entry of an author search result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCandidate {
    /// Displayed name.
    pub name: String,

    /// Profile link as it appears in the page (usually relative).
    pub profile_href: Option<String>,

    /// Domain from the "Verified email at …" line.
    pub verified_domain: Option<String>,
}

/// Author search URL for a name.
pub fn search_url(citations_url: &str, name: &str) -> ClientResult<String> {
    Url::parse_with_params(
        citations_url,
        &[("hl", "en"), ("view_op", "search_authors"), ("mauthors", name)],
    )
    .map(String::from)
    .map_err(|source| ClientError::InvalidUrl { url: citations_url.to_string(), source })
}

/// Extract the candidates from a search result page, in page order.
#[must_use]
pub fn parse_candidates(html: &str) -> Vec<AuthorCandidate> {
    let document = Html::parse_document(html);
    document
        .select(&CANDIDATE)
        .map(|card| {
            let link = card.select(&PHOTO_LINK).next().or_else(|| card.select(&NAME_LINK).next());
            let name = card.select(&NAME_LINK).next().map(element_text).unwrap_or_default();
            let verified_domain =
                card.select(&EMAIL).next().and_then(|e| verified_domain(&element_text(e)));
            AuthorCandidate {
                name,
                profile_href: link.and_then(|a| a.value().attr("href")).map(str::to_string),
                verified_domain,
            }
        })
        .collect()
}

/// Domain from a "Verified email at x.edu - Homepage" line.
#[must_use]
pub fn verified_domain(text: &str) -> Option<String> {
    VERIFIED_EMAIL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// Pick the candidate for an award investigator.
///
/// A single candidate is accepted as is. With several, the first whose
/// verified domain equals `email_domain` wins; later matches are not considered.
pub fn choose_candidate<'a>(
    candidates: &'a [AuthorCandidate],
    email_domain: &str,
    query: &str,
) -> ScrapeResult<&'a AuthorCandidate> {
    match candidates {
        [] => Err(ScrapeError::NoCandidates { query: query.to_string() }),
        [only] => Ok(only),
        many => many
            .iter()
            .find(|c| {
                c.verified_domain.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(email_domain))
            })
            .ok_or_else(|| ScrapeError::NoDomainMatch {
                query: query.to_string(),
                domain: email_domain.to_string(),
                candidates: many.len(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(user: &str, name: &str, email_line: &str) -> String {
        format!(
            r#"<div class="gs_ai gs_scl gs_ai_chpr">
                 <a class="gs_ai_pho" href="/citations?hl=en&amp;user={user}"><img></a>
                 <div class="gs_ai_t">
                   <h3 class="gs_ai_name"><a href="/citations?hl=en&amp;user={user}">{name}</a></h3>
                   <div class="gs_ai_eml">{email_line}</div>
                 </div>
               </div>"#
        )
    }

    fn candidate(domain: Option<&str>, user: &str) -> AuthorCandidate {
        AuthorCandidate {
            name: "A".into(),
            profile_href: Some(format!("/citations?user={user}")),
            verified_domain: domain.map(str::to_string),
        }
    }

    #[test]
    fn test_search_url_encodes_name() {
        let url = search_url("https://scholar.google.com/citations", "Ana María").unwrap();
        assert!(url.starts_with("https://scholar.google.com/citations?hl=en&view_op=search_authors"));
        assert!(url.contains("mauthors=Ana+Mar%C3%ADa"));
    }

    #[test]
    fn test_parse_candidates() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            card("u1", "Jane Doe", "Verified email at x.edu - Homepage"),
            card("u2", "Jane Doe", "")
        );
        let candidates = parse_candidates(&html);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Jane Doe");
        assert_eq!(candidates[0].verified_domain.as_deref(), Some("x.edu"));
        assert_eq!(candidates[0].profile_href.as_deref(), Some("/citations?hl=en&user=u1"));
        assert_eq!(candidates[1].verified_domain, None);
    }

    #[test]
    fn test_verified_domain() {
        assert_eq!(verified_domain("Verified email at psych.x.edu").as_deref(), Some("psych.x.edu"));
        assert_eq!(verified_domain("Verified email at x.edu - Homepage").as_deref(), Some("x.edu"));
        assert_eq!(verified_domain("No verified email"), None);
    }

    #[test]
    fn test_single_candidate_accepted_regardless_of_domain() {
        let candidates = vec![candidate(Some("other.org"), "u1")];
        let chosen = choose_candidate(&candidates, "x.edu", "Jane Doe").unwrap();
        assert_eq!(chosen.profile_href.as_deref(), Some("/citations?user=u1"));

        let candidates = vec![candidate(None, "u1")];
        assert!(choose_candidate(&candidates, "x.edu", "Jane Doe").is_ok());
    }

    #[test]
    fn test_first_domain_match_wins() {
        let candidates = vec![
            candidate(Some("y.edu"), "u1"),
            candidate(Some("X.edu"), "u2"),
            candidate(Some("x.edu"), "u3"),
        ];
        let chosen = choose_candidate(&candidates, "x.edu", "Jane Doe").unwrap();
        assert_eq!(chosen.profile_href.as_deref(), Some("/citations?user=u2"));
    }

    #[test]
    fn test_no_match_fails() {
        let candidates = vec![candidate(Some("y.edu"), "u1"), candidate(None, "u2")];
        let err = choose_candidate(&candidates, "x.edu", "Jane Doe").unwrap_err();
        assert!(matches!(err, ScrapeError::NoDomainMatch { candidates: 2, .. }));

        let err = choose_candidate(&[], "x.edu", "Jane Doe").unwrap_err();
        assert!(matches!(err, ScrapeError::NoCandidates { .. }));
    }
}
