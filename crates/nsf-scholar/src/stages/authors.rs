//! Author resolution: award investigators to Google Scholar profiles.
//!
//! Each investigator is searched by name, disambiguated by email domain, and
//! the matched profile is scraped for citation metrics and interests. The
//! batch runs in a loop of fresh sessions so that a blocked or dropped
//! session costs only the rows it had not reached yet.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{Completion, existing_output};
use crate::client::{Launcher, RecyclePolicy, Session};
use crate::config::{Config, Paths};
use crate::error::{ClientError, PipelineResult, ScrapeError, ScrapeResult};
use crate::models::{AuthorRecord, AwardRecord, CitationHistogram};
use crate::scrape::{profile, resolve_url, search};
use crate::tables;

/// Resolve one investigator's profile.
///
/// # Errors
///
/// Returns a [`ScrapeError`] when no profile can be matched or its metrics
/// cannot be read. Session-level client errors are returned as
/// [`ScrapeError::Client`] for the caller to inspect.
pub async fn resolve_author<L: Launcher>(
    session: &mut Session<L>,
    config: &Config,
    award: &AwardRecord,
) -> ScrapeResult<AuthorRecord> {
    let query = award.search_name();
    let domain = award.email_domain().unwrap_or_default();

    let html = session.open(&search::search_url(&config.citations_url(), &query)?).await?;
    let candidates = search::parse_candidates(&html);
    let chosen = search::choose_candidate(&candidates, domain, &query)?;
    debug!(query = %query, candidates = candidates.len(), name = %chosen.name, "Matched author");

    let href = chosen.profile_href.as_deref().ok_or_else(|| ScrapeError::missing("a.gs_ai_pho"))?;
    let profile_url = resolve_url(&config.scholar_url, href)?;

    let html = session.open(&profile_url).await?;
    let metrics = profile::parse_metrics(&html)?;
    let citations = profile::parse_histogram(&html).unwrap_or_else(|e| {
        debug!(url = %profile_url, error = %e, "No citation histogram on profile");
        CitationHistogram::new()
    });

    Ok(AuthorRecord {
        url: Some(profile_url),
        total_citations: Some(metrics.total_citations),
        h_index: Some(metrics.h_index),
        interests: profile::parse_interests(&html),
        citations,
        ..AuthorRecord::unresolved(award)
    })
}

/// Resolve every award in one session, in order.
///
/// Each processed row is appended to `processed`, resolved or not. A
/// session-level failure stops the pass and is returned; the row it
/// happened on is left unprocessed.
async fn resolve_pass<L: Launcher>(
    session: &mut Session<L>,
    config: &Config,
    awards: &[AwardRecord],
    processed: &mut Vec<AuthorRecord>,
) -> Result<(), ClientError> {
    for award in awards {
        let author = match resolve_author(session, config, award).await {
            Ok(author) => {
                info!(
                    author = %author.display_name(),
                    url = author.url.as_deref().unwrap_or_default(),
                    "Resolved author"
                );
                author
            }
            Err(ScrapeError::Client(e)) if e.is_session_failure() => return Err(e),
            Err(e) => {
                warn!(author = %award.search_name(), error = %e, "Could not resolve author");
                AuthorRecord::unresolved(award)
            }
        };
        processed.push(author);
        session.complete().await;
    }
    Ok(())
}

/// Resolve a year's awards with batch-level retries.
///
/// Every iteration starts a fresh session over the rows not yet processed,
/// after a cooldown that honors the site's `Retry-After` when longer. The
/// loop ends when fewer than two rows remain, or after
/// `config.max_session_failures` iterations in a row that failed without
/// progress. Returns every processed row, including unresolved ones.
pub async fn resolve_year<L: Launcher>(
    config: &Config,
    launcher: L,
    awards: Vec<AwardRecord>,
) -> Vec<AuthorRecord> {
    let mut session = Session::new(launcher, RecyclePolicy::never());
    let mut remaining = awards;
    let mut processed: Vec<AuthorRecord> = Vec::new();
    let mut failures = 0;

    while !remaining.is_empty() {
        session.close();
        let before = processed.len();
        let outcome = resolve_pass(&mut session, config, &remaining, &mut processed).await;

        let done: HashSet<&str> = processed[before..].iter().map(|a| a.email.as_str()).collect();
        remaining.retain(|award| !done.contains(award.email().unwrap_or_default()));
        let progressed = processed.len() > before;

        let mut cooldown = None;
        if let Err(e) = outcome {
            failures = if progressed { 1 } else { failures + 1 };
            warn!(error = %e, remaining = remaining.len(), failures, "Scraping session failed");
            if failures >= config.max_session_failures {
                warn!(remaining = remaining.len(), "Too many session failures, giving up");
                break;
            }
            cooldown = Some(config.cooldown_after(&e));
        }

        if remaining.len() < 2 {
            if let Some(last) = remaining.first() {
                warn!(author = %last.search_name(), "Leaving last unprocessed author");
            }
            break;
        }

        if let Some(cooldown) = cooldown {
            session.restart(cooldown).await;
        }
    }

    session.close();
    processed
}

/// Awards of a year with an email, one per email in file order.
#[must_use]
pub fn awards_for_year(awards: Vec<AwardRecord>, year: i32) -> Vec<AwardRecord> {
    let mut seen = HashSet::new();
    awards
        .into_iter()
        .filter(|a| a.year == year)
        .filter(|a| a.email().is_some_and(|e| seen.insert(e.to_string())))
        .collect()
}

/// Run the stage for one award year and write `author_info_{year}.csv`.
///
/// Only authors with a matched profile are written. If no row could be
/// processed at all the table is not written, so the year can be rerun.
///
/// # Errors
///
/// Returns [`crate::error::PipelineError::MissingInput`] if the award table
/// does not exist, or an I/O error writing the output.
pub async fn run<L: Launcher>(
    config: &Config,
    paths: &Paths,
    launcher: L,
    year: i32,
    funding_info: Option<&Path>,
) -> PipelineResult<Completion> {
    let output = paths.author_info(year);
    if let Some(done) = existing_output(&output) {
        return Ok(done);
    }

    let input = funding_info.map_or_else(|| paths.funding_info(), Path::to_path_buf);
    let awards = awards_for_year(tables::read_awards(&input)?, year);
    info!(year, awards = awards.len(), "Resolving authors");

    let processed = resolve_year(config, launcher, awards).await;
    if processed.is_empty() {
        warn!(year, path = %output.display(), "No authors processed, not writing author table");
        return Ok(Completion::NotWritten(output));
    }

    let scraped = processed.len();
    let authors: Vec<AuthorRecord> = processed.into_iter().filter(AuthorRecord::is_resolved).collect();
    info!(year, scraped, resolved = authors.len(), "Author resolution finished");

    tables::write_authors(&output, &authors)?;
    info!(path = %output.display(), "Wrote author table");

    Ok(Completion::Written { path: output, rows: authors.len() })
}
