//! Publication detail pages.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{element_text, first_text, selector};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{
    ABSTRACT_NOT_FOUND, AUTHORS_NOT_FOUND, CitationHistogram, DATE_NOT_FOUND, JOURNAL_NOT_FOUND,
    PublicationDetails,
};

static FIELD_ROW: LazyLock<Selector> = LazyLock::new(|| selector("div.gs_scl"));
static FIELD_LABEL: LazyLock<Selector> = LazyLock::new(|| selector("div.gsc_oci_field"));
static FIELD_VALUE: LazyLock<Selector> = LazyLock::new(|| selector("div.gsc_oci_value"));
static ABSTRACT: LazyLock<Selector> = LazyLock::new(|| selector("div.gsh_csp"));
static ABSTRACT_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector("div.gsh_small"));
static GRAPH_YEAR: LazyLock<Selector> =
    LazyLock::new(|| selector("#gsc_oci_graph_bars span.gsc_oci_g_t"));
static GRAPH_COUNT: LazyLock<Selector> =
    LazyLock::new(|| selector("#gsc_oci_graph_bars a.gsc_oci_g_a span.gsc_oci_g_al"));

/// Field labels that name the venue, in order of preference.
pub const VENUE_LABELS: &[&str] = &["Journal", "Conference", "Book", "Source"];

/// Each field of a publication page, scraped independently.
#[derive(Debug)]
pub struct ScrapedDetails {
    /// "Authors" field.
    pub authors: ScrapeResult<String>,

    /// "Publication date" field.
    pub publication_date: ScrapeResult<String>,

    /// First venue field present.
    pub journal: ScrapeResult<String>,

    /// Abstract text.
    pub r#abstract: ScrapeResult<String>,

    /// Citations per year; empty when the page has no graph.
    pub citations: CitationHistogram,
}

impl ScrapedDetails {
    /// Field failures, labelled, for logging.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &ScrapeError)> {
        [
            ("authors", &self.authors),
            ("publication_date", &self.publication_date),
            ("journal", &self.journal),
            ("abstract", &self.r#abstract),
        ]
        .into_iter()
        .filter_map(|(field, result)| result.as_ref().err().map(|e| (field, e)))
    }

    /// Collapse into a record, writing sentinels for missing fields.
    #[must_use]
    pub fn into_details(self) -> PublicationDetails {
        PublicationDetails {
            authors: self.authors.unwrap_or_else(|_| AUTHORS_NOT_FOUND.to_string()),
            publication_date: self
                .publication_date
                .unwrap_or_else(|_| DATE_NOT_FOUND.to_string()),
            journal: self.journal.unwrap_or_else(|_| JOURNAL_NOT_FOUND.to_string()),
            r#abstract: self.r#abstract.unwrap_or_else(|_| ABSTRACT_NOT_FOUND.to_string()),
            citations: self.citations,
        }
    }
}

/// Scrape every detail field of a publication page.
#[must_use]
pub fn parse_details(html: &str) -> ScrapedDetails {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let citations = CitationHistogram::from_positional(
        document.select(&GRAPH_YEAR).map(element_text),
        document.select(&GRAPH_COUNT).map(element_text),
    );

    ScrapedDetails {
        authors: labelled_value(root, &["Authors"]),
        publication_date: labelled_value(root, &["Publication date"]),
        journal: labelled_value(root, VENUE_LABELS),
        r#abstract: first_text(
            root,
            &[("div.gsh_csp", &ABSTRACT), ("div.gsh_small", &ABSTRACT_FALLBACK)],
        ),
        citations,
    }
}

/// Value of the first `div.gs_scl` row whose label is one of `labels`,
/// trying labels in the given order.
fn labelled_value(root: ElementRef<'_>, labels: &[&str]) -> ScrapeResult<String> {
    let rows: Vec<(String, ElementRef<'_>)> = root
        .select(&FIELD_ROW)
        .filter_map(|row| {
            let label = row.select(&FIELD_LABEL).next().map(element_text)?;
            let value = row.select(&FIELD_VALUE).next()?;
            Some((label, value))
        })
        .collect();

    labels
        .iter()
        .find_map(|wanted| rows.iter().find(|(label, _)| label == wanted))
        .map(|(_, value)| element_text(*value))
        .ok_or_else(|| ScrapeError::missing(format!("gs_scl field {}", labels.join(" | "))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, value: &str) -> String {
        format!(
            r#"<div class="gs_scl"><div class="gsc_oci_field">{label}</div><div class="gsc_oci_value">{value}</div></div>"#
        )
    }

    fn page(fields: &str, extra: &str) -> String {
        format!(r#"<html><body><div id="gsc_oci_table">{fields}</div>{extra}</body></html>"#)
    }

    const GRAPH: &str = r##"
        <div id="gsc_oci_graph_bars">
          <span class="gsc_oci_g_t">2016</span><span class="gsc_oci_g_t">2017</span>
          <a class="gsc_oci_g_a" href="#"><span class="gsc_oci_g_al">4</span></a>
          <a class="gsc_oci_g_a" href="#"><span class="gsc_oci_g_al">11</span></a>
        </div>"##;

    #[test]
    fn test_full_page() {
        let fields = [
            field("Authors", "Jane Doe, John Roe"),
            field("Publication date", "2016/3/1"),
            field("Journal", "Journal of Things"),
            field(
                "Description",
                r#"<div class="gsh_small"><div class="gsh_csp">We study things.</div></div>"#,
            ),
        ]
        .concat();
        let scraped = parse_details(&page(&fields, GRAPH));
        assert_eq!(scraped.failures().count(), 0);

        let details = scraped.into_details();
        assert_eq!(details.authors, "Jane Doe, John Roe");
        assert_eq!(details.publication_date, "2016/3/1");
        assert_eq!(details.journal, "Journal of Things");
        assert_eq!(details.r#abstract, "We study things.");
        assert_eq!(details.citations.get(2017), Some(11));
    }

    #[test]
    fn test_venue_label_order() {
        let fields = [field("Source", "arXiv"), field("Conference", "ICML")].concat();
        let scraped = parse_details(&page(&fields, ""));
        assert_eq!(scraped.journal.unwrap(), "ICML");

        let scraped = parse_details(&page(&field("Book", "Handbook"), ""));
        assert_eq!(scraped.journal.unwrap(), "Handbook");
    }

    #[test]
    fn test_abstract_fallback() {
        let fields = field("Description", r#"<div class="gsh_small">Short one.</div>"#);
        let scraped = parse_details(&page(&fields, ""));
        assert_eq!(scraped.r#abstract.unwrap(), "Short one.");
    }

    #[test]
    fn test_missing_fields_become_sentinels() {
        let scraped = parse_details(&page(&field("Authors", "Solo Author"), ""));
        let failed: Vec<&str> = scraped.failures().map(|(f, _)| f).collect();
        assert_eq!(failed, vec!["publication_date", "journal", "abstract"]);

        let details = scraped.into_details();
        assert_eq!(details.authors, "Solo Author");
        assert_eq!(details.publication_date, DATE_NOT_FOUND);
        assert_eq!(details.journal, JOURNAL_NOT_FOUND);
        assert_eq!(details.r#abstract, ABSTRACT_NOT_FOUND);
        assert!(details.citations.is_empty());
    }
}
