//! CSV persistence for the pipeline tables.
//!
//! Every table is written as UTF-8 with a byte-order mark. Author and
//! publication tables carry one `citation_{year}` column per distinct year
//! present in any row, so their headers are built per write.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::error::{PipelineError, PipelineResult};
use crate::models::citations::{column_name, column_year, parse_count};
use crate::models::{
    AuthorRecord, AwardRecord, CitationHistogram, PublicationDetails, PublicationRecord,
};

/// UTF-8 signature written at the start of every table.
pub const BOM: &str = "\u{feff}";

const AUTHOR_COLUMNS: &[&str] = &[
    "first_name",
    "middle_name",
    "last_name",
    "email",
    "institution",
    "url",
    "total_citations",
    "h_index",
    "interests",
];

const PUBLICATION_COLUMNS: &[&str] =
    &["first_name", "middle_name", "last_name", "email", "title", "year", "cited_by", "url"];

const DETAIL_COLUMNS: &[&str] = &["authors", "publication_date", "journal", "abstract"];

/// Write the award table.
pub fn write_awards(path: &Path, awards: &[AwardRecord]) -> PipelineResult<()> {
    write_atomically(path, |writer| {
        let mut csv = csv::Writer::from_writer(writer);
        for award in awards {
            csv.serialize(award)?;
        }
        csv.flush()?;
        Ok(())
    })
}

/// Read the award table.
pub fn read_awards(path: &Path) -> PipelineResult<Vec<AwardRecord>> {
    let mut reader = open_reader(path)?;
    reader.deserialize::<AwardRecord>().map(|row| row.map_err(PipelineError::from)).collect()
}

/// Write an author table.
pub fn write_authors(path: &Path, authors: &[AuthorRecord]) -> PipelineResult<()> {
    let years = citation_years(authors.iter().map(|a| &a.citations));

    let mut header: Vec<String> = AUTHOR_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    header.extend(years.iter().map(|y| column_name(*y)));

    let rows = authors
        .iter()
        .map(|author| -> PipelineResult<Vec<String>> {
            let mut row = vec![
                author.first_name.clone(),
                author.middle_name.clone(),
                author.last_name.clone(),
                author.email.clone(),
                author.institution.clone(),
                author.url.clone().unwrap_or_default(),
                optional(author.total_citations),
                optional(author.h_index),
                serde_json::to_string(&author.interests)?,
            ];
            row.extend(histogram_cells(&author.citations, &years));
            Ok(row)
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    write_rows(path, &header, &rows)
}

/// Read an author table.
pub fn read_authors(path: &Path) -> PipelineResult<Vec<AuthorRecord>> {
    let mut reader = open_reader(path)?;
    let columns = Columns::new(reader.headers()?);

    let mut authors = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = columns.row(&record);
        let interests = match row.get("interests") {
            "" => Vec::new(),
            json => serde_json::from_str(json)?,
        };
        authors.push(AuthorRecord {
            first_name: row.get("first_name").to_string(),
            middle_name: row.get("middle_name").to_string(),
            last_name: row.get("last_name").to_string(),
            email: row.get("email").to_string(),
            institution: row.get("institution").to_string(),
            url: row.optional("url"),
            total_citations: parse_count(row.get("total_citations")),
            h_index: parse_count(row.get("h_index")),
            interests,
            citations: row.histogram(),
        });
    }
    Ok(authors)
}

/// Write a publication table.
///
/// With `with_details == false` only the discovery columns are written (the
/// pass-1 table); otherwise detail columns and citation-year columns follow.
pub fn write_publications(
    path: &Path,
    publications: &[PublicationRecord],
    with_details: bool,
) -> PipelineResult<()> {
    let years = if with_details {
        citation_years(publications.iter().filter_map(|p| p.details.as_ref()).map(|d| &d.citations))
    } else {
        Vec::new()
    };

    let mut header: Vec<String> = PUBLICATION_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    if with_details {
        header.extend(DETAIL_COLUMNS.iter().map(|c| (*c).to_string()));
        header.extend(years.iter().map(|y| column_name(*y)));
    }

    let rows: Vec<Vec<String>> = publications
        .iter()
        .map(|publication| {
            let mut row = vec![
                publication.first_name.clone(),
                publication.middle_name.clone(),
                publication.last_name.clone(),
                publication.email.clone(),
                publication.title.clone(),
                publication.year.to_string(),
                optional(publication.cited_by),
                publication.url.clone(),
            ];
            if with_details {
                let blank = PublicationDetails::default();
                let details = publication.details.as_ref().unwrap_or(&blank);
                row.extend([
                    details.authors.clone(),
                    details.publication_date.clone(),
                    details.journal.clone(),
                    details.r#abstract.clone(),
                ]);
                row.extend(histogram_cells(&details.citations, &years));
            }
            row
        })
        .collect();

    write_rows(path, &header, &rows)
}

/// Read a publication table of either shape.
pub fn read_publications(path: &Path) -> PipelineResult<Vec<PublicationRecord>> {
    let mut reader = open_reader(path)?;
    let columns = Columns::new(reader.headers()?);
    let has_details = DETAIL_COLUMNS.iter().all(|c| columns.contains(c));

    let mut publications = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = columns.row(&record);

        let details = if has_details {
            let details = PublicationDetails {
                authors: row.get("authors").to_string(),
                publication_date: row.get("publication_date").to_string(),
                journal: row.get("journal").to_string(),
                r#abstract: row.get("abstract").to_string(),
                citations: row.histogram(),
            };
            (!details.is_blank()).then_some(details)
        } else {
            None
        };

        publications.push(PublicationRecord {
            first_name: row.get("first_name").to_string(),
            middle_name: row.get("middle_name").to_string(),
            last_name: row.get("last_name").to_string(),
            email: row.get("email").to_string(),
            title: row.get("title").to_string(),
            year: row.get("year").trim().parse().unwrap_or_default(),
            cited_by: parse_count(row.get("cited_by")),
            url: row.get("url").to_string(),
            details,
        });
    }
    Ok(publications)
}

/// Open a table for reading, skipping the byte-order mark.
pub fn open_reader(path: &Path) -> PipelineResult<csv::Reader<Cursor<Vec<u8>>>> {
    if !path.exists() {
        return Err(PipelineError::missing_input(path));
    }
    let content = fs::read_to_string(path)?;
    let content = content.strip_prefix(BOM).map(str::to_string).unwrap_or(content);
    Ok(csv::Reader::from_reader(Cursor::new(content.into_bytes())))
}

fn write_rows(path: &Path, header: &[String], rows: &[Vec<String>]) -> PipelineResult<()> {
    write_atomically(path, |writer| {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(header)?;
        for row in rows {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    })
}

/// Write to a sibling temp file and rename, so an interrupted write never
/// leaves a truncated table behind.
fn write_atomically<F>(path: &Path, write: F) -> PipelineResult<()>
where
    F: FnOnce(&mut Vec<u8>) -> PipelineResult<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut buffer = BOM.as_bytes().to_vec();
    write(&mut buffer)?;

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp)?;
    file.write_all(&buffer)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn citation_years<'a>(histograms: impl Iterator<Item = &'a CitationHistogram>) -> Vec<i32> {
    histograms.flat_map(|h| h.years()).collect::<BTreeSet<_>>().into_iter().collect()
}

fn histogram_cells<'a>(
    histogram: &'a CitationHistogram,
    years: &'a [i32],
) -> impl Iterator<Item = String> + 'a {
    years.iter().map(|y| optional(histogram.get(*y)))
}

fn optional(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Header lookup by column name.
struct Columns {
    index: HashMap<String, usize>,
    years: Vec<(i32, usize)>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index: HashMap<String, usize> =
            headers.iter().enumerate().map(|(i, h)| (h.trim().to_string(), i)).collect();
        let years = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| column_year(h.trim()).map(|y| (y, i)))
            .collect();
        Self { index, years }
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn row<'a>(&'a self, record: &'a StringRecord) -> Row<'a> {
        Row { columns: self, record }
    }
}

struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl Row<'_> {
    /// Cell text, or `""` when the column is absent.
    fn get(&self, name: &str) -> &str {
        self.columns.index.get(name).and_then(|i| self.record.get(*i)).unwrap_or("")
    }

    fn optional(&self, name: &str) -> Option<String> {
        Some(self.get(name).trim()).filter(|v| !v.is_empty()).map(str::to_string)
    }

    fn histogram(&self) -> CitationHistogram {
        self.columns
            .years
            .iter()
            .filter_map(|(year, i)| {
                self.record.get(*i).and_then(parse_count).map(|count| (*year, count))
            })
            .collect()
    }
}
