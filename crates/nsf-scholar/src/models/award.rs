//! Award record extracted from an NSF XML file.

use serde::{Deserialize, Serialize};

/// One funded project and its principal investigator.
///
/// Column order here is the column order of `funding_info.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    /// Award year (the yearly folder the file came from).
    pub year: i32,

    /// PI first name.
    #[serde(default)]
    pub first_name: String,

    /// PI middle initial.
    #[serde(default)]
    pub middle_name: String,

    /// PI last name.
    #[serde(default)]
    pub last_name: String,

    /// PI email; `None` when the award lists none.
    #[serde(default)]
    pub email: Option<String>,

    /// Awardee institution.
    #[serde(default)]
    pub institution: String,

    /// NSF directorate long name.
    #[serde(default)]
    pub directorate: String,

    /// NSF division long name.
    #[serde(default)]
    pub division: String,

    /// Effective date as written in the XML.
    #[serde(default)]
    pub effective_date: String,

    /// Expiration date as written in the XML.
    #[serde(default)]
    pub expiration_date: String,

    /// Total intended amount.
    #[serde(default)]
    pub award_amount: String,

    /// Award title.
    #[serde(default)]
    pub award_title: String,

    /// Abstract narration.
    #[serde(default, rename = "abstract")]
    pub r#abstract: String,
}

impl AwardRecord {
    /// Non-blank email, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// Domain part of the email (text after the last `@`).
    #[must_use]
    pub fn email_domain(&self) -> Option<&str> {
        self.email().and_then(|e| e.rsplit_once('@')).map(|(_, domain)| domain)
    }

    /// Name as searched for: `"first last"`.
    #[must_use]
    pub fn search_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim()).trim().to_string()
    }
}
