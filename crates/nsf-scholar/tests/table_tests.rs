//! CSV table layout: BOM, dynamic citation columns and optional cells.

use std::fs;

use nsf_scholar::models::{AuthorRecord, CitationHistogram, PublicationDetails, PublicationRecord};
use nsf_scholar::tables;
use nsf_scholar::error::PipelineError;

fn author(email: &str, citations: &[(i32, u64)]) -> AuthorRecord {
    AuthorRecord {
        first_name: "Jane".into(),
        middle_name: "Q".into(),
        last_name: "Doe".into(),
        email: email.into(),
        institution: "X University".into(),
        url: Some("https://scholar.google.com/citations?hl=en&user=u1".into()),
        total_citations: Some(1200),
        h_index: Some(14),
        interests: vec!["Memory".into(), "Sleep, \"deep\"".into()],
        citations: citations.iter().copied().collect(),
    }
}

#[test]
fn test_author_table_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("author_info").join("author_info_2015.csv");

    tables::write_authors(&path, &[author("a@x.edu", &[(2016, 4), (2014, 1)]), author("b@x.edu", &[(2015, 9)])])
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let header = content.strip_prefix(tables::BOM).unwrap().lines().next().unwrap();
    assert_eq!(
        header,
        "first_name,middle_name,last_name,email,institution,url,total_citations,h_index,interests,\
         citation_2014,citation_2015,citation_2016"
    );

    let authors = tables::read_authors(&path).unwrap();
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0], author("a@x.edu", &[(2016, 4), (2014, 1)]));
    assert_eq!(authors[1].citations.get(2014), None);
    assert_eq!(authors[1].citations.get(2015), Some(9));
}

#[test]
fn test_interests_are_a_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authors.csv");
    tables::write_authors(&path, &[author("a@x.edu", &[])]).unwrap();

    let mut reader = tables::open_reader(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let record = reader.records().next().unwrap().unwrap();
    let column = headers.iter().position(|h| h == "interests").unwrap();

    let interests: Vec<String> = serde_json::from_str(&record[column]).unwrap();
    assert_eq!(interests, vec!["Memory", "Sleep, \"deep\""]);
}

#[test]
fn test_publication_tables_of_both_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let jane = author("a@x.edu", &[]);

    let mut enriched = PublicationRecord::discovered(&jane, "Paper".into(), 2014, None, "https://s/c?x=1".into());
    enriched.details = Some(PublicationDetails {
        authors: "J Doe".into(),
        publication_date: "2014/1/1".into(),
        journal: "Journal".into(),
        r#abstract: "Text".into(),
        citations: [(2015, 3)].into_iter().collect::<CitationHistogram>(),
    });
    let failed = PublicationRecord::discovered(&jane, "Other".into(), 2016, Some(8), "https://s/c?x=2".into());

    let pass_one = dir.path().join("pub_url.csv");
    tables::write_publications(&pass_one, &[enriched.clone(), failed.clone()], false).unwrap();
    let rows = tables::read_publications(&pass_one).unwrap();
    assert!(rows.iter().all(|r| r.details.is_none()));
    assert_eq!(rows[1].cited_by, Some(8));

    let final_table = dir.path().join("pub_info.csv");
    tables::write_publications(&final_table, &[enriched.clone(), failed.clone()], true).unwrap();
    let rows = tables::read_publications(&final_table).unwrap();
    assert_eq!(rows, vec![enriched, failed]);
}

#[test]
fn test_missing_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = tables::read_authors(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput { .. }));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn test_tables_are_written_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.csv");
    tables::write_authors(&path, &[]).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.csv"]);
}
