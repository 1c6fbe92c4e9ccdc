//! Property-based tests for the year window, domain matching and histograms.

use proptest::prelude::*;

use nsf_scholar::Config;
use nsf_scholar::models::AwardRecord;
use nsf_scholar::models::citations::{column_name, column_year};
use nsf_scholar::models::CitationHistogram;
use nsf_scholar::scrape::search::{AuthorCandidate, choose_candidate};

fn candidate(domain: Option<String>, index: usize) -> AuthorCandidate {
    AuthorCandidate {
        name: format!("Candidate {index}"),
        profile_href: Some(format!("/citations?user=u{index}")),
        verified_domain: domain,
    }
}

/// Domains drawn from a small pool so that collisions happen.
fn arb_domain() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just("x.edu".to_string()),
        Just("y.edu".to_string()),
        Just("psych.x.edu".to_string()),
        Just("X.EDU".to_string()),
    ])
}

proptest! {
    /// The window is inclusive, symmetric and exactly 2w + 1 years wide.
    #[test]
    fn window_is_inclusive(year in 1990i32..2030, pub_year in 1980i32..2040) {
        let config = Config::default();
        let (first, last) = config.window(year);
        prop_assert_eq!(last - first, 2 * config.year_window);
        let inside = (first..=last).contains(&pub_year);
        prop_assert_eq!(inside, (pub_year - year).abs() <= 3);
    }

    /// A single candidate is always chosen, whatever its domain.
    #[test]
    fn single_candidate_always_chosen(domain in arb_domain(), wanted in "[a-z]{1,8}\\.(edu|org)") {
        let candidates = vec![candidate(domain, 0)];
        prop_assert!(choose_candidate(&candidates, &wanted, "q").is_ok());
    }

    /// With several candidates the choice is the first case-insensitive domain match.
    #[test]
    fn several_candidates_first_match(domains in proptest::collection::vec(arb_domain(), 2..6)) {
        let candidates: Vec<AuthorCandidate> =
            domains.into_iter().enumerate().map(|(i, d)| candidate(d, i)).collect();

        let expected = candidates.iter().position(|c| {
            c.verified_domain.as_deref().is_some_and(|d| d.eq_ignore_ascii_case("x.edu"))
        });

        match (choose_candidate(&candidates, "x.edu", "q"), expected) {
            (Ok(chosen), Some(i)) => prop_assert_eq!(chosen, &candidates[i]),
            (Err(_), None) => {}
            (result, expected) => prop_assert!(false, "got {:?}, expected index {:?}", result.ok(), expected),
        }
    }

    /// The email domain is everything after the last `@`.
    #[test]
    fn email_domain_after_last_at(local in "[a-z.]{1,10}", domain in "[a-z]{1,10}\\.edu") {
        let award = AwardRecord { email: Some(format!("{local}@{domain}")), ..Default::default() };
        prop_assert_eq!(award.email_domain(), Some(domain.as_str()));
    }

    /// Positional pairing keeps min(years, counts) entries for distinct years.
    #[test]
    fn histogram_pairs_positionally(
        counts in proptest::collection::vec(0u64..100_000, 0..15),
        extra_years in 0usize..5,
    ) {
        let years: Vec<String> = (0..counts.len() + extra_years).map(|i| (2000 + i).to_string()).collect();
        let labels: Vec<String> = counts.iter().map(u64::to_string).collect();

        let histogram = CitationHistogram::from_positional(&years, &labels);

        prop_assert_eq!(histogram.len(), counts.len());
        prop_assert_eq!(histogram.total(), counts.iter().sum::<u64>());
        for (i, count) in counts.iter().enumerate() {
            prop_assert_eq!(histogram.get(2000 + i as i32), Some(*count));
        }
    }

    /// Citation column names map back to their year.
    #[test]
    fn citation_column_names(year in 1900i32..2100) {
        prop_assert_eq!(column_year(&column_name(year)), Some(year));
    }
}
