//! Prioritized line-item matching.
//!
//! Provider statements label their rows with free text ("Interest Expense",
//! "Interest Expense Non Operating", "EBIT", "Operating Income", ...). A
//! [`LineItemQuery`] lists acceptable keywords in priority order plus keywords
//! that disqualify a row, and [`LineItemQuery::resolve`] picks one row.

use infradash_core::{Statement, StatementRow};
use tracing::trace;

/// EBIT, falling back to operating income. Margin rows are never picked.
pub const EBIT: LineItemQuery<'static> =
    LineItemQuery::new(&["EBIT", "OPERATING INCOME"]).excluding(&["MARGIN"]);

/// Interest expense under its common spellings.
pub const INTEREST_EXPENSE: LineItemQuery<'static> = LineItemQuery::new(&[
    "INTEREST EXPENSE",
    "INTEREST AND DEBT EXPENSE",
    "INTEREST EXPENSE AND DEBT",
]);

/// Cash from operating activities.
pub const OPERATING_CASH_FLOW: LineItemQuery<'static> = LineItemQuery::new(&[
    "TOTAL CASH FROM OPERATING ACTIVITIES",
    "OPERATING CASH FLOW",
    "CASH FLOW FROM OPERATING",
]);

/// Dividends paid to shareholders.
pub const DIVIDENDS_PAID: LineItemQuery<'static> = LineItemQuery::new(&[
    "CASH DIVIDENDS PAID",
    "DIVIDENDS PAID",
    "COMMON STOCK DIVIDENDS PAID",
]);

/// A request for one line item: keyword aliases in priority order, plus
/// keywords that exclude a row.
///
/// Matching is a case-insensitive substring test against row labels. Alias
/// order is priority order: the first alias that matches any admissible row
/// wins, even if a later alias would match a row that looks like a better fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineItemQuery<'a> {
    aliases: &'a [&'a str],
    exclusions: &'a [&'a str],
}

impl<'a> LineItemQuery<'a> {
    /// Creates a query with the given aliases and no exclusions.
    #[must_use]
    pub const fn new(aliases: &'a [&'a str]) -> Self {
        Self {
            aliases,
            exclusions: &[],
        }
    }

    /// Sets the exclusion keywords.
    #[must_use]
    pub const fn excluding(mut self, exclusions: &'a [&'a str]) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Returns the aliases in priority order.
    #[must_use]
    pub const fn aliases(&self) -> &'a [&'a str] {
        self.aliases
    }

    /// Returns the exclusion keywords.
    #[must_use]
    pub const fn exclusions(&self) -> &'a [&'a str] {
        self.exclusions
    }

    /// Returns true if `label` contains no exclusion keyword.
    fn admits(&self, label_upper: &str) -> bool {
        !self
            .exclusions
            .iter()
            .any(|bad| label_upper.contains(&bad.to_uppercase()))
    }

    /// Picks the row for this line item.
    ///
    /// For each alias in priority order, rows are scanned in the statement's
    /// native order and the first row whose label contains the alias and no
    /// exclusion keyword is returned. When several rows match the same alias
    /// the earliest one wins.
    #[must_use]
    pub fn resolve<'s>(&self, statement: &'s Statement) -> Option<&'s StatementRow> {
        if statement.is_empty() {
            return None;
        }

        let labels: Vec<String> = statement.iter().map(|r| r.label.to_uppercase()).collect();

        for alias in self.aliases {
            let alias_upper = alias.to_uppercase();
            for (row, label) in statement.iter().zip(&labels) {
                if label.contains(&alias_upper) && self.admits(label) {
                    trace!(alias = %alias, label = %row.label, "Resolved line item");
                    return Some(row);
                }
            }
        }

        None
    }
}

/// Resolves `query` against a possibly missing statement.
///
/// Returns `None` when the statement is missing or empty, or when no alias
/// matches an admissible row.
#[must_use]
pub fn resolve_row<'s>(
    statement: Option<&'s Statement>,
    query: &LineItemQuery<'_>,
) -> Option<&'s StatementRow> {
    statement.and_then(|s| query.resolve(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infradash_core::PeriodType;

    fn statement(labels: &[&str]) -> Statement {
        Statement::from_rows(
            PeriodType::Quarterly,
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| StatementRow::new(*l).with_value("2024-03-31", i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_excluded_row_falls_through_to_next_alias() {
        let stmt = statement(&["EBIT Margin", "Operating Income"]);
        let row = EBIT.resolve(&stmt).unwrap();
        assert_eq!(row.label, "Operating Income");
    }

    #[test]
    fn test_first_alias_wins_over_later_rows() {
        let stmt = statement(&["Operating Income", "EBIT Margin", "Ebit"]);
        let row = EBIT.resolve(&stmt).unwrap();
        assert_eq!(row.label, "Ebit");
    }

    #[test]
    fn test_case_insensitive_substring() {
        let stmt = statement(&["Total Revenue", "interest expense non operating"]);
        let row = INTEREST_EXPENSE.resolve(&stmt).unwrap();
        assert_eq!(row.label, "interest expense non operating");
    }

    #[test]
    fn test_duplicate_matches_take_native_order() {
        let stmt = statement(&["Dividends Paid Preferred", "Cash Dividends Paid"]);
        // "CASH DIVIDENDS PAID" is tried first and only the second row has it.
        assert_eq!(
            DIVIDENDS_PAID.resolve(&stmt).unwrap().label,
            "Cash Dividends Paid"
        );

        let stmt = statement(&["Dividends Paid Preferred", "Dividends Paid Common"]);
        assert_eq!(
            DIVIDENDS_PAID.resolve(&stmt).unwrap().label,
            "Dividends Paid Preferred"
        );
    }

    #[test]
    fn test_no_match() {
        let stmt = statement(&["Total Revenue", "Net Income"]);
        assert!(OPERATING_CASH_FLOW.resolve(&stmt).is_none());
    }

    #[test]
    fn test_missing_or_empty_statement() {
        assert!(resolve_row(None, &EBIT).is_none());
        let empty = Statement::new(PeriodType::Quarterly);
        assert!(resolve_row(Some(&empty), &EBIT).is_none());
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let query = LineItemQuery::new(&["ebit"]).excluding(&["margin"]);
        let stmt = statement(&["EBIT MARGIN"]);
        assert!(query.resolve(&stmt).is_none());
        assert_eq!(query.aliases(), &["ebit"]);
        assert_eq!(query.exclusions(), &["margin"]);
    }
}
