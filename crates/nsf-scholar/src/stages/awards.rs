//! Award extraction: yearly folders of NSF award XML into `funding_info.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{Completion, existing_output};
use crate::config::Paths;
use crate::error::{PipelineError, PipelineResult};
use crate::models::AwardRecord;
use crate::tables;
use crate::xml::{self, Element};

/// Role code of the investigator whose details are kept.
pub const PRINCIPAL_INVESTIGATOR: &str = "Principal Investigator";

/// Exact-match filter on the award's organization.
#[derive(Debug, Clone, Default)]
pub struct AwardFilter {
    /// Directorate long name, if filtering.
    pub directorate: Option<String>,

    /// Division long name, if filtering.
    pub division: Option<String>,
}

impl AwardFilter {
    /// Whether an award passes every configured condition.
    #[must_use]
    pub fn matches(&self, award: &AwardRecord) -> bool {
        self.directorate.as_deref().is_none_or(|d| award.directorate == d)
            && self.division.as_deref().is_none_or(|d| award.division == d)
    }
}

/// Where to read awards from.
#[derive(Debug, Clone)]
pub struct AwardSource {
    /// Directory holding one subfolder per year.
    pub base_path: PathBuf,

    /// First year, inclusive.
    pub start_year: i32,

    /// Last year, inclusive.
    pub end_year: i32,
}

/// Build an award record from one XML document.
///
/// # Errors
///
/// Returns the parse error for malformed XML or a document without an
/// `Award` element.
pub fn parse_award(year: i32, content: impl AsRef<[u8]>) -> Result<AwardRecord, String> {
    let root = xml::parse(content)?;
    let award = root.child("Award").ok_or_else(|| "no Award element".to_string())?;

    let mut record = AwardRecord {
        year,
        institution: award.text_or_empty("Institution/Name"),
        directorate: award.text_or_empty("Organization/Directorate/LongName"),
        division: award.text_or_empty("Organization/Division/LongName"),
        effective_date: award.text_or_empty("AwardEffectiveDate"),
        expiration_date: award.text_or_empty("AwardExpirationDate"),
        award_amount: award.text_or_empty("AwardTotalIntnAmount"),
        award_title: award.text_or_empty("AwardTitle"),
        r#abstract: award.text_or_empty("AbstractNarration"),
        ..AwardRecord::default()
    };

    if let Some(pi) = principal_investigator(award) {
        record.first_name = pi.text_or_empty("FirstName");
        record.middle_name = pi.text_or_empty("PI_MID_INIT");
        record.last_name = pi.text_or_empty("LastName");
        record.email = pi
            .find_text("EmailAddress")
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
    }

    Ok(record)
}

/// First investigator listed as principal investigator.
fn principal_investigator(award: &Element) -> Option<&Element> {
    award
        .children_named("Investigator")
        .find(|inv| inv.find_text("RoleCode") == Some(PRINCIPAL_INVESTIGATOR))
}

/// Extract every award of the year range that passes the filter.
///
/// Missing year folders and unreadable or malformed files are logged and
/// skipped.
#[must_use]
pub fn extract_awards(source: &AwardSource, filter: &AwardFilter) -> Vec<AwardRecord> {
    let mut awards = Vec::new();

    for year in source.start_year..=source.end_year {
        let folder = source.base_path.join(year.to_string());
        let files = match xml_files(&folder) {
            Ok(files) => files,
            Err(e) => {
                warn!(year, folder = %folder.display(), error = %e, "Skipping award year");
                continue;
            }
        };
        info!(year, files = files.len(), "Processing award folder");

        for file in files {
            match load_award(&file, year) {
                Ok(award) if filter.matches(&award) => awards.push(award),
                Ok(_) => debug!(file = %file.display(), "Award filtered out"),
                Err(e) => warn!(file = %file.display(), error = %e, "Skipping malformed award file"),
            }
        }
    }

    awards
}

/// Read and parse one award file.
fn load_award(path: &Path, year: i32) -> PipelineResult<AwardRecord> {
    let content = fs::read(path)?;
    parse_award(year, &content).map_err(|message| PipelineError::xml(path, message))
}

/// `*.xml` files of a folder, sorted by name.
fn xml_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();
    Ok(files)
}

/// Run the stage: extract awards and write `funding_info.csv`.
///
/// # Errors
///
/// Returns an error only if the output table cannot be written.
pub fn run(paths: &Paths, source: &AwardSource, filter: &AwardFilter) -> PipelineResult<Completion> {
    let output = paths.funding_info();
    if let Some(done) = existing_output(&output) {
        return Ok(done);
    }

    let awards = extract_awards(source, filter);
    tables::write_awards(&output, &awards)?;
    info!(rows = awards.len(), path = %output.display(), "Wrote award table");

    Ok(Completion::Written { path: output, rows: awards.len() })
}
