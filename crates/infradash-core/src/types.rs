//! Core data types for the credit dashboard.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`StatementRow`] - One loosely-labeled line item with its period values
//! - [`Statement`] - An ordered collection of rows (native provider order)
//! - [`QuarterlyFinancials`] - Quarterly income and cash-flow statements
//! - [`CompanySnapshot`] - Summary "info" fields, any of which may be absent

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::frequency::PeriodType;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single (period, value) entry of a statement row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    /// Period label as reported by the provider (usually `YYYY-MM-DD`).
    pub period: String,
    /// Reported value for the period.
    pub value: f64,
}

/// One line item of a financial statement.
///
/// Labels are free text chosen by the provider; period order is whatever the
/// provider returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Line-item label (e.g. "Interest Expense").
    pub label: String,
    /// Values per period, in provider order.
    pub values: Vec<PeriodValue>,
}

impl StatementRow {
    /// Creates an empty row with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: Vec::new(),
        }
    }

    /// Appends a period value.
    #[must_use]
    pub fn with_value(mut self, period: impl Into<String>, value: f64) -> Self {
        self.push(period, value);
        self
    }

    /// Appends a period value.
    pub fn push(&mut self, period: impl Into<String>, value: f64) {
        self.values.push(PeriodValue {
            period: period.into(),
            value,
        });
    }

    /// Returns the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A financial statement: rows in the provider's native order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Period type of every row.
    pub period_type: PeriodType,
    rows: Vec<StatementRow>,
}

impl Statement {
    /// Creates an empty statement.
    #[must_use]
    pub fn new(period_type: PeriodType) -> Self {
        Self {
            period_type,
            rows: Vec::new(),
        }
    }

    /// Creates a statement from already-built rows.
    #[must_use]
    pub fn from_rows(period_type: PeriodType, rows: Vec<StatementRow>) -> Self {
        Self { period_type, rows }
    }

    /// Records `value` for `label` in `period`.
    ///
    /// A new row is appended the first time a label is seen, so row order
    /// follows first appearance in the provider payload.
    pub fn insert(&mut self, label: &str, period: &str, value: f64) {
        match self.rows.iter_mut().find(|r| r.label == label) {
            Some(row) => row.push(period, value),
            None => self.rows.push(StatementRow::new(label).with_value(period, value)),
        }
    }

    /// Returns the rows in native order.
    #[must_use]
    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &StatementRow> {
        self.rows.iter()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the statement has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Quarterly income and cash-flow statements for one company.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFinancials {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Quarterly income statement.
    pub income: Statement,
    /// Quarterly cash-flow statement.
    pub cash_flow: Statement,
}

impl QuarterlyFinancials {
    /// Creates empty quarterly financials for a symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            income: Statement::new(PeriodType::Quarterly),
            cash_flow: Statement::new(PeriodType::Quarterly),
        }
    }

    /// Returns true if neither statement has any row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.cash_flow.is_empty()
    }
}

/// Summary "info" snapshot for a company.
///
/// Mirrors the flat info mapping of quote APIs. Every field may be absent and
/// absence is never replaced with an estimate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Last traded price.
    pub current_price: Option<f64>,
    /// Enterprise value / EBITDA multiple.
    pub enterprise_to_ebitda: Option<f64>,
    /// Return on equity, as a fraction.
    pub return_on_equity: Option<f64>,
    /// Mean analyst target price.
    pub target_mean_price: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,
    /// Total cash and equivalents.
    pub total_cash: Option<f64>,
    /// EBITDA (usually trailing twelve months).
    pub ebitda: Option<f64>,
    /// Net debt, when the provider reports it directly.
    pub net_debt: Option<f64>,
    /// Dividend yield, as reported (fraction or percent).
    pub dividend_yield: Option<f64>,
}

impl CompanySnapshot {
    /// Creates an empty snapshot for a symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }
}

/// Turns a provider field key into a human line-item label.
///
/// `totalCashFromOperatingActivities` becomes `Total Cash From Operating
/// Activities`; runs of capitals stay together (`EBITDA`, `netIncomeFromEBIT`),
/// and snake/kebab case separators become spaces.
#[must_use]
pub fn humanize_label(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        let boundary = c.is_uppercase()
            && !current.is_empty()
            && (prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
                || next.is_some_and(char::is_lowercase));

        if boundary {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercase() {
        assert_eq!(Symbol::new("kmi").as_str(), "KMI");
        assert_eq!(Symbol::from("^tnx").to_string(), "^TNX");
    }

    #[test]
    fn test_statement_insert_keeps_first_appearance_order() {
        let mut stmt = Statement::new(PeriodType::Quarterly);
        stmt.insert("Interest Expense", "2024-06-30", -120.0);
        stmt.insert("Ebit", "2024-06-30", 400.0);
        stmt.insert("Interest Expense", "2024-03-31", -110.0);

        let labels: Vec<&str> = stmt.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Interest Expense", "Ebit"]);
        assert_eq!(stmt.rows()[0].len(), 2);
        assert_eq!(stmt.rows()[1].values[0].value, 400.0);
    }

    #[test]
    fn test_quarterly_financials_empty() {
        let mut fin = QuarterlyFinancials::new(Symbol::new("WMB"));
        assert!(fin.is_empty());
        fin.cash_flow.insert("Dividends Paid", "2024-06-30", -50.0);
        assert!(!fin.is_empty());
    }

    #[test]
    fn test_humanize_label() {
        assert_eq!(
            humanize_label("totalCashFromOperatingActivities"),
            "Total Cash From Operating Activities"
        );
        assert_eq!(humanize_label("interestExpense"), "Interest Expense");
        assert_eq!(humanize_label("ebit"), "Ebit");
        assert_eq!(humanize_label("EBITDA"), "EBITDA");
        assert_eq!(humanize_label("netIncomeFromEBIT"), "Net Income From EBIT");
        assert_eq!(humanize_label("cash_dividends_paid"), "Cash Dividends Paid");
        assert_eq!(humanize_label(""), "");
    }
}
