//! Sparse year → citation-count histograms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix of the dynamic per-year columns in every table.
pub const COLUMN_PREFIX: &str = "citation_";

/// Citations received per calendar year.
///
/// Only years that appear on the page are present; a missing year is unknown,
/// not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationHistogram(BTreeMap<i32, u64>);

impl CitationHistogram {
    /// Create an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair year labels with counts by position.
    ///
    /// Extra labels or counts on either side are ignored, as are pairs where
    /// either value is not a number.
    #[must_use]
    pub fn from_positional<Y, C>(years: Y, counts: C) -> Self
    where
        Y: IntoIterator,
        Y::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut histogram = Self::new();
        for (year, count) in years.into_iter().zip(counts) {
            let year = year.as_ref().trim().parse::<i32>();
            let count = parse_count(count.as_ref());
            if let (Ok(year), Some(count)) = (year, count) {
                histogram.insert(year, count);
            }
        }
        histogram
    }

    /// Set the count for a year.
    pub fn insert(&mut self, year: i32, count: u64) {
        self.0.insert(year, count);
    }

    /// Count for a year, if known.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<u64> {
        self.0.get(&year).copied()
    }

    /// Years with a known count, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    /// `(year, count)` pairs, ascending by year.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        self.0.iter().map(|(y, c)| (*y, *c))
    }

    /// Number of known years.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no year is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all known years.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl FromIterator<(i32, u64)> for CitationHistogram {
    fn from_iter<T: IntoIterator<Item = (i32, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Column name for a year, e.g. `citation_2015`.
#[must_use]
pub fn column_name(year: i32) -> String {
    format!("{COLUMN_PREFIX}{year}")
}

/// Year encoded in a column name, if it is a citation column.
#[must_use]
pub fn column_year(name: &str) -> Option<i32> {
    name.strip_prefix(COLUMN_PREFIX)?.parse().ok()
}

/// Parse a displayed count such as `1,234` or ` 17 `.
#[must_use]
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| !matches!(c, ',' | ' ' | '\u{a0}')).collect();
    digits.parse().ok()
}
