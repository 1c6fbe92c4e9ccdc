//! Publication records built by the two publication passes.

use serde::{Deserialize, Serialize};

use super::{AuthorRecord, CitationHistogram};

/// Sentinel written when the author list is missing.
pub const AUTHORS_NOT_FOUND: &str = "authors not found";

/// Sentinel written when the publication date is missing.
pub const DATE_NOT_FOUND: &str = "date not found";

/// Sentinel written when the venue is missing.
pub const JOURNAL_NOT_FOUND: &str = "journal not found";

/// Sentinel written when no abstract selector matched.
pub const ABSTRACT_NOT_FOUND: &str = "Abstract not found";

/// A work listed on an author's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Author first name.
    pub first_name: String,

    /// Author middle initial.
    pub middle_name: String,

    /// Author last name.
    pub last_name: String,

    /// Author email, linking back to the author table.
    pub email: String,

    /// Title as listed.
    pub title: String,

    /// Year as listed.
    pub year: i32,

    /// "Cited by" count as listed.
    pub cited_by: Option<u64>,

    /// Publication detail page.
    pub url: String,

    /// Filled in by the detail pass; `None` until then or if the page failed.
    pub details: Option<PublicationDetails>,
}

impl PublicationRecord {
    /// A newly discovered work for an author.
    #[must_use]
    pub fn discovered(
        author: &AuthorRecord,
        title: String,
        year: i32,
        cited_by: Option<u64>,
        url: String,
    ) -> Self {
        Self {
            first_name: author.first_name.clone(),
            middle_name: author.middle_name.clone(),
            last_name: author.last_name.clone(),
            email: author.email.clone(),
            title,
            year,
            cited_by,
            url,
            details: None,
        }
    }

    /// Identity used for resuming: the same URL may belong to several co-authors.
    #[must_use]
    pub fn key(&self) -> (String, String) {
        (self.email.clone(), self.url.clone())
    }
}

/// Bibliographic details scraped from a publication page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDetails {
    /// Author list as displayed.
    pub authors: String,

    /// Publication date as displayed.
    pub publication_date: String,

    /// Journal, conference or other venue.
    pub journal: String,

    /// Abstract text.
    pub r#abstract: String,

    /// Citations per year.
    pub citations: CitationHistogram,
}

impl PublicationDetails {
    /// Whether every field is empty (a blank row in a table).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.authors.is_empty()
            && self.publication_date.is_empty()
            && self.journal.is_empty()
            && self.r#abstract.is_empty()
            && self.citations.is_empty()
    }
}
