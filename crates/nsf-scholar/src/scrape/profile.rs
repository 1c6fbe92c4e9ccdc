//! Author profile pages: metrics, interests, histogram and the works list.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{element_text, selector};
use crate::error::{ClientError, ClientResult, ScrapeError, ScrapeResult};
use crate::models::CitationHistogram;
use crate::models::citations::parse_count;

static STATS_ROW: LazyLock<Selector> = LazyLock::new(|| selector("#gsc_rsb_st tbody tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static INTEREST: LazyLock<Selector> = LazyLock::new(|| selector("div#gsc_prf_int a.gsc_prf_inta"));
static HISTOGRAM_YEAR: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_g_t"));
static HISTOGRAM_COUNT: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_g_a"));
static WORK_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.gsc_a_tr"));
static WORK_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_a_at"));
static WORK_CITED_BY: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_a_ac"));
static WORK_YEAR: LazyLock<Selector> = LazyLock::new(|| selector("span.gsc_a_hc"));
static WORK_YEAR_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_a_h"));
static LOAD_MORE: LazyLock<Selector> = LazyLock::new(|| selector("button#gsc_bpf_more"));

/// Histogram containers, newest layout first.
const HISTOGRAM_CONTAINERS: &[&str] = &["div.gsc_md_hist_w", "div.gsc_g_hist_wrp"];

/// Headline metrics from the citation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationMetrics {
    /// "Citations / All".
    pub total_citations: u64,

    /// "h-index / All".
    pub h_index: u64,
}

/// A row of the works table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedWork {
    /// Title text.
    pub title: String,

    /// Detail link as it appears in the page.
    pub href: Option<String>,

    /// Listed year; some works have none.
    pub year: Option<i32>,

    /// Cited-by count; blank for uncited works.
    pub cited_by: Option<u64>,
}

/// One page of a profile's works table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorksPage {
    /// Rows in page order.
    pub works: Vec<ListedWork>,

    /// Whether the "show more" control is still enabled.
    pub has_more: bool,
}

/// Total citations and h-index: column 2 of rows 1 and 2 of `#gsc_rsb_st`.
pub fn parse_metrics(html: &str) -> ScrapeResult<CitationMetrics> {
    let document = Html::parse_document(html);
    let rows: Vec<ElementRef<'_>> = document.select(&STATS_ROW).collect();

    let cell = |row: usize, field: &'static str| -> ScrapeResult<u64> {
        let text = rows
            .get(row)
            .and_then(|r| r.select(&CELL).nth(1))
            .map(element_text)
            .ok_or_else(|| ScrapeError::missing(format!("#gsc_rsb_st row {} column 2", row + 1)))?;
        parse_count(&text).ok_or_else(|| ScrapeError::invalid_number(field, text))
    };

    Ok(CitationMetrics { total_citations: cell(0, "total_citations")?, h_index: cell(1, "h_index")? })
}

/// Yearly citations, pairing year labels with bar values by position.
pub fn parse_histogram(html: &str) -> ScrapeResult<CitationHistogram> {
    let document = Html::parse_document(html);
    for css in HISTOGRAM_CONTAINERS {
        if let Some(container) = document.select(&selector(css)).next() {
            let years = container.select(&HISTOGRAM_YEAR).map(element_text);
            let counts = container.select(&HISTOGRAM_COUNT).map(element_text);
            return Ok(CitationHistogram::from_positional(years, counts));
        }
    }
    Err(ScrapeError::missing(HISTOGRAM_CONTAINERS.join(" | ")))
}

/// Research interests in page order; empty when the profile lists none.
#[must_use]
pub fn parse_interests(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document.select(&INTEREST).map(element_text).filter(|i| !i.is_empty()).collect()
}

/// The works table and "show more" state of a profile page.
#[must_use]
pub fn parse_works(html: &str) -> WorksPage {
    let document = Html::parse_document(html);

    let works = document
        .select(&WORK_ROW)
        .map(|row| {
            let title = row.select(&WORK_TITLE).next();
            let year = row
                .select(&WORK_YEAR)
                .next()
                .or_else(|| row.select(&WORK_YEAR_FALLBACK).next())
                .map(element_text)
                .and_then(|y| y.parse().ok());
            ListedWork {
                title: title.map(element_text).unwrap_or_default(),
                href: title.and_then(|a| a.value().attr("href")).map(str::to_string),
                year,
                cited_by: row
                    .select(&WORK_CITED_BY)
                    .next()
                    .and_then(|a| parse_count(&element_text(a))),
            }
        })
        .collect();

    let has_more = document
        .select(&LOAD_MORE)
        .next()
        .is_some_and(|button| button.value().attr("disabled").is_none());

    WorksPage { works, has_more }
}

/// Profile URL for the page of works starting at `start`.
pub fn works_page_url(profile_url: &str, start: usize, page_size: usize) -> ClientResult<String> {
    let mut url = Url::parse(profile_url)
        .map_err(|source| ClientError::InvalidUrl { url: profile_url.to_string(), source })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "cstart" && k != "pagesize")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("cstart", &start.to_string())
        .append_pair("pagesize", &page_size.to_string());

    Ok(url.into())
}
