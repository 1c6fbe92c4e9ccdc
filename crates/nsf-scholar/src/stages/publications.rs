//! Publication resolution in two passes.
//!
//! Pass 1 lists each author's works within the award-year window and records
//! their detail URLs. Pass 2 visits every URL for bibliographic details. The
//! passes use separate sessions and both persist as they go, so an
//! interrupted run resumes where it stopped.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{Completion, existing_output};
use crate::client::{Launcher, Session};
use crate::config::{Config, Paths};
use crate::error::{PipelineResult, ScrapeError, ScrapeResult};
use crate::models::{AuthorRecord, PublicationDetails, PublicationRecord};
use crate::scrape::{profile, publication, resolve_url};
use crate::tables;

/// List an author's works published within `window` (inclusive).
///
/// Pages through the profile until the "show more" control is disabled or a
/// page has no rows. Works without a year or a usable link are skipped.
///
/// # Errors
///
/// Returns an error if a profile page cannot be loaded or the author has no
/// profile URL.
pub async fn discover_works<L: Launcher>(
    session: &mut Session<L>,
    config: &Config,
    author: &AuthorRecord,
    window: (i32, i32),
) -> ScrapeResult<Vec<PublicationRecord>> {
    let profile_url = author.url.as_deref().ok_or_else(|| ScrapeError::missing("author url"))?;
    let (first, last) = window;

    let mut works = Vec::new();
    let mut start = 0;
    loop {
        let page_url = profile::works_page_url(profile_url, start, config.page_size)?;
        let page = profile::parse_works(&session.open(&page_url).await?);
        let rows = page.works.len();
        debug!(author = %author.display_name(), start, rows, "Loaded works page");

        for work in page.works {
            let (Some(year), Some(href)) = (work.year, work.href.as_deref()) else {
                debug!(title = %work.title, "Skipping work without year or link");
                continue;
            };
            if !(first..=last).contains(&year) {
                continue;
            }
            match resolve_url(&config.scholar_url, href) {
                Ok(url) => {
                    works.push(PublicationRecord::discovered(author, work.title, year, work.cited_by, url));
                }
                Err(e) => debug!(title = %work.title, href, error = %e, "Skipping work with invalid link"),
            }
        }

        if rows == 0 || !page.has_more {
            break;
        }
        start += rows;
    }

    Ok(works)
}

/// Scrape one publication page, retrying on session failures.
///
/// Returns `None` if the page cannot be loaded; missing fields become
/// sentinels.
pub async fn fetch_details<L: Launcher>(
    session: &mut Session<L>,
    config: &Config,
    url: &str,
) -> Option<PublicationDetails> {
    let mut failures = 0;
    loop {
        match session.open(url).await {
            Ok(html) => {
                let scraped = publication::parse_details(&html);
                for (field, error) in scraped.failures() {
                    warn!(url, field, error = %error, "Publication field not found");
                }
                return Some(scraped.into_details());
            }
            Err(e) if e.is_session_failure() => {
                failures += 1;
                warn!(url, error = %e, failures, "Scraping session failed");
                if failures >= config.max_session_failures {
                    return None;
                }
                session.restart(config.cooldown_after(&e)).await;
            }
            Err(e) => {
                warn!(url, error = %e, "Could not load publication page");
                return None;
            }
        }
    }
}

/// Pass 1: discover works for every author, persisting after each author.
///
/// Authors already present in an existing pass-1 table are skipped.
async fn discover<L: Launcher>(
    config: &Config,
    launcher: L,
    authors: &[AuthorRecord],
    year: i32,
    path: &Path,
) -> PipelineResult<Vec<PublicationRecord>> {
    let mut discovered =
        if path.exists() { tables::read_publications(path)? } else { Vec::new() };
    let done: HashSet<String> = discovered.iter().map(|p| p.email.clone()).collect();
    if !done.is_empty() {
        info!(authors = done.len(), rows = discovered.len(), "Resuming URL discovery");
    }

    let window = config.window(year);
    let mut session = Session::new(launcher, config.discovery_policy());

    for author in authors.iter().filter(|a| !done.contains(&a.email)) {
        let mut failures = 0;
        loop {
            match discover_works(&mut session, config, author, window).await {
                Ok(works) => {
                    info!(author = %author.display_name(), works = works.len(), "Discovered works");
                    discovered.extend(works);
                    break;
                }
                Err(e) => match e.session_failure() {
                    Some(client) => {
                        failures += 1;
                        warn!(author = %author.display_name(), error = %client, failures, "Scraping session failed");
                        if failures >= config.max_session_failures {
                            warn!(author = %author.display_name(), "Skipping author after repeated failures");
                            break;
                        }
                        session.restart(config.cooldown_after(client)).await;
                    }
                    None => {
                        warn!(author = %author.display_name(), error = %e, "Could not list works");
                        break;
                    }
                },
            }
        }

        tables::write_publications(path, &discovered, false)?;
        session.complete().await;
    }

    session.close();
    Ok(discovered)
}

/// Pass 2: fetch details for every discovered row, checkpointing as it goes.
///
/// Rows already in the checkpoint are not fetched again.
async fn enrich<L: Launcher>(
    config: &Config,
    launcher: L,
    discovered: Vec<PublicationRecord>,
    checkpoint: &Path,
) -> PipelineResult<Vec<PublicationRecord>> {
    let mut enriched =
        if checkpoint.exists() { tables::read_publications(checkpoint)? } else { Vec::new() };
    let done: HashSet<(String, String)> = enriched.iter().map(PublicationRecord::key).collect();
    let pending: Vec<PublicationRecord> =
        discovered.into_iter().filter(|p| !done.contains(&p.key())).collect();
    info!(resumed = enriched.len(), pending = pending.len(), "Fetching publication details");

    let mut session = Session::new(launcher, config.detail_policy());

    for (index, mut row) in pending.into_iter().enumerate() {
        row.details = fetch_details(&mut session, config, &row.url).await;
        debug!(title = %row.title, found = row.details.is_some(), "Fetched publication");
        enriched.push(row);

        if !config.row_delay.is_zero() {
            tokio::time::sleep(config.row_delay).await;
        }

        let count = index + 1;
        if config.checkpoint_every > 0 && count % config.checkpoint_every == 0 {
            tables::write_publications(checkpoint, &enriched, true)?;
            info!(rows = enriched.len(), "Saved checkpoint");
        }
        session.complete().await;
    }

    session.close();
    Ok(enriched)
}

/// Run both passes for one award year and write `pub_info_{year}.csv`.
///
/// # Errors
///
/// Returns [`crate::error::PipelineError::MissingInput`] if the author table
/// does not exist, or an I/O error writing a table.
pub async fn run<L: Launcher + Clone>(
    config: &Config,
    paths: &Paths,
    launcher: L,
    year: i32,
) -> PipelineResult<Completion> {
    let output = paths.pub_info(year);
    if let Some(done) = existing_output(&output) {
        return Ok(done);
    }

    let authors = tables::read_authors(&paths.author_info(year))?;
    let pub_url = paths.pub_url(year, config.year_window);
    let checkpoint = paths.pub_info_checkpoint(year);

    let discovered = if checkpoint.exists() && pub_url.exists() {
        info!(path = %checkpoint.display(), "Checkpoint found, skipping URL discovery");
        tables::read_publications(&pub_url)?
    } else {
        info!(year, authors = authors.len(), "Discovering publication URLs");
        discover(config, launcher.clone(), &authors, year, &pub_url).await?
    };

    let enriched = enrich(config, launcher, discovered, &checkpoint).await?;
    tables::write_publications(&output, &enriched, true)?;
    info!(rows = enriched.len(), path = %output.display(), "Wrote publication table");

    for intermediate in [&checkpoint, &pub_url] {
        if intermediate.exists() {
            fs::remove_file(intermediate)?;
            debug!(path = %intermediate.display(), "Removed intermediate table");
        }
    }

    Ok(Completion::Written { path: output, rows: enriched.len() })
}
