//! Author record produced by the author resolver.

use serde::{Deserialize, Serialize};

use super::{AwardRecord, CitationHistogram};

/// An award investigator and, when matched, their scholar profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// First name.
    pub first_name: String,

    /// Middle initial.
    pub middle_name: String,

    /// Last name.
    pub last_name: String,

    /// Email; identifies the author within an award year.
    pub email: String,

    /// Institution from the award.
    pub institution: String,

    /// Resolved profile URL.
    pub url: Option<String>,

    /// Total citations shown on the profile.
    pub total_citations: Option<u64>,

    /// h-index shown on the profile.
    pub h_index: Option<u64>,

    /// Research interests, in page order.
    pub interests: Vec<String>,

    /// Citations per year.
    pub citations: CitationHistogram,
}

impl AuthorRecord {
    /// Author built from an award row with nothing resolved yet.
    #[must_use]
    pub fn unresolved(award: &AwardRecord) -> Self {
        Self {
            first_name: award.first_name.clone(),
            middle_name: award.middle_name.clone(),
            last_name: award.last_name.clone(),
            email: award.email().unwrap_or_default().to_string(),
            institution: award.institution.clone(),
            ..Self::default()
        }
    }

    /// Whether a profile was matched.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.url.is_some()
    }

    /// Author name for logs.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
