//! Record types for the three pipeline tables.
//!
//! Optional values are `Option`s rather than blank columns; the CSV layer in
//! [`crate::tables`] maps between the two.

mod author;
mod award;
pub mod citations;
mod publication;

pub use author::AuthorRecord;
pub use award::AwardRecord;
pub use citations::CitationHistogram;
pub use publication::{
    ABSTRACT_NOT_FOUND, AUTHORS_NOT_FOUND, DATE_NOT_FOUND, JOURNAL_NOT_FOUND, PublicationDetails,
    PublicationRecord,
};
