//! Tender selection.

use infradash_core::SeenSet;
use std::collections::HashSet;

use crate::client::Opportunity;

/// Agencies whose postings are forwarded by default.
pub const DEFAULT_TARGET_AGENCIES: &[&str] = &[
    "DEPT OF DEFENSE",
    "DEPARTMENT OF ENERGY",
    "NATIONAL AERONAUTICS AND SPACE ADMINISTRATION",
];

/// Shortest description, in characters, that marks a substantial posting.
pub const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 200;

/// Which postings the tender alert forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderFilter {
    target_agencies: Vec<String>,
    min_description_chars: usize,
}

impl Default for TenderFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_TARGET_AGENCIES.iter().copied(),
            DEFAULT_MIN_DESCRIPTION_CHARS,
        )
    }
}

impl TenderFilter {
    /// Builds a filter; agency names are matched upper-cased.
    pub fn new<I, S>(target_agencies: I, min_description_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            target_agencies: target_agencies
                .into_iter()
                .map(|a| a.as_ref().to_uppercase())
                .collect(),
            min_description_chars,
        }
    }

    /// Upper-cased target agency names.
    pub fn target_agencies(&self) -> &[String] {
        &self.target_agencies
    }

    /// Minimum description length.
    pub const fn min_description_chars(&self) -> usize {
        self.min_description_chars
    }

    /// True if the posting comes from a target agency and is substantial.
    ///
    /// Does not look at the seen set.
    #[must_use]
    pub fn matches(&self, opp: &Opportunity) -> bool {
        let agency = opp.agency.to_uppercase();
        self.target_agencies.iter().any(|t| agency.contains(t.as_str()))
            && opp.description.chars().count() >= self.min_description_chars
    }

    /// Picks the postings to forward, in input order.
    ///
    /// Skips IDs in `seen`, repeats of an ID within `opps`, and postings
    /// that do not [`match`](Self::matches).
    #[must_use]
    pub fn select<'a>(&self, opps: &'a [Opportunity], seen: &SeenSet) -> Vec<&'a Opportunity> {
        let mut taken: HashSet<&str> = HashSet::new();
        opps.iter()
            .filter(|o| !seen.contains(&o.notice_id))
            .filter(|o| self.matches(o))
            .filter(|o| taken.insert(o.notice_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opp(id: &str, agency: &str, description_len: usize) -> Opportunity {
        Opportunity {
            notice_id: id.to_string(),
            title: format!("Posting {id}"),
            agency: agency.to_string(),
            description: "d".repeat(description_len),
            ..Default::default()
        }
    }

    #[test]
    fn test_matches_agency_case_insensitively() {
        let filter = TenderFilter::default();
        assert!(filter.matches(&opp("1", "Dept of Defense.DEFENSE LOGISTICS AGENCY", 200)));
        assert!(filter.matches(&opp("2", "DEPARTMENT OF ENERGY.SCIENCE", 500)));
        assert!(!filter.matches(&opp("3", "GENERAL SERVICES ADMINISTRATION", 500)));
    }

    #[test]
    fn test_short_description_is_skipped() {
        let filter = TenderFilter::default();
        assert!(!filter.matches(&opp("1", "DEPT OF DEFENSE", 199)));
        assert!(filter.matches(&opp("1", "DEPT OF DEFENSE", 200)));
    }

    #[test]
    fn test_select_skips_seen_and_repeats() {
        let filter = TenderFilter::default();
        let opps = vec![
            opp("a", "DEPT OF DEFENSE.ARMY", 300),
            opp("b", "NATIONAL AERONAUTICS AND SPACE ADMINISTRATION", 300),
            opp("c", "DEPT OF DEFENSE", 10),
            opp("d", "DEPARTMENT OF AGRICULTURE", 300),
            opp("b", "NATIONAL AERONAUTICS AND SPACE ADMINISTRATION", 300),
            opp("e", "DEPARTMENT OF ENERGY", 300),
        ];
        let seen: SeenSet = ["a".to_string()].into_iter().collect();

        let ids: Vec<&str> = filter
            .select(&opps, &seen)
            .into_iter()
            .map(|o| o.notice_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "e"]);
    }

    #[test]
    fn test_custom_filter() {
        let filter = TenderFilter::new(["department of the interior"], 0);
        assert_eq!(filter.target_agencies(), ["DEPARTMENT OF THE INTERIOR"]);
        assert!(filter.matches(&opp("x", "DEPARTMENT OF THE INTERIOR.BLM", 0)));
    }
}
