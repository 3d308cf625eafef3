//! Derived credit ratios.
//!
//! Each ratio is built from [`LineItemQuery`](crate::query::LineItemQuery)
//! resolution and [`ttm_sum`], and yields a [`CreditMetric`]. Missing inputs
//! always produce [`CreditMetric::Unavailable`]; nothing here returns an error
//! and nothing substitutes a proxy value.

use infradash_core::{CompanySnapshot, QuarterlyFinancials, Statement};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::{
    DIVIDENDS_PAID, EBIT, INTEREST_EXPENSE, LineItemQuery, OPERATING_CASH_FLOW, resolve_row,
};
use crate::ttm::{TTM_QUARTERS, ttm_sum};

/// A derived ratio: a definite value or explicitly unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CreditMetric {
    /// The ratio could be computed from authoritative inputs.
    Value(f64),
    /// An input was missing or the denominator was zero.
    #[default]
    Unavailable,
}

impl CreditMetric {
    /// Wraps an optional number; `None` and non-finite values are unavailable.
    #[must_use]
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Value(v),
            _ => Self::Unavailable,
        }
    }

    /// Returns the value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    /// Returns true if the metric has a value.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Option<f64>> for CreditMetric {
    fn from(value: Option<f64>) -> Self {
        Self::from_option(value)
    }
}

/// `numerator_TTM / |denominator_TTM|` over rows of one statement.
///
/// The window is one year of the statement's periods: four quarters, or the
/// latest fiscal year of an annual statement.
fn ttm_coverage(
    statement: Option<&Statement>,
    numerator: &LineItemQuery<'_>,
    denominator: &LineItemQuery<'_>,
) -> CreditMetric {
    let periods = statement.map_or(TTM_QUARTERS, |s| s.period_type.periods_per_year());
    let num = ttm_sum(resolve_row(statement, numerator), periods);
    let den = ttm_sum(resolve_row(statement, denominator), periods);

    match (num, den) {
        (Some(num), Some(den)) if den != 0.0 => CreditMetric::from_option(Some(num / den.abs())),
        _ => {
            debug!(?num, ?den, "Coverage inputs incomplete");
            CreditMetric::Unavailable
        }
    }
}

/// Interest coverage (TTM) = EBIT / |interest expense|, from the quarterly
/// income statement.
#[must_use]
pub fn interest_coverage_ttm(income: Option<&Statement>) -> CreditMetric {
    ttm_coverage(income, &EBIT, &INTEREST_EXPENSE)
}

/// Dividend coverage (TTM) = operating cash flow / |dividends paid|, from the
/// quarterly cash-flow statement.
#[must_use]
pub fn dividend_coverage_ttm(cash_flow: Option<&Statement>) -> CreditMetric {
    ttm_coverage(cash_flow, &OPERATING_CASH_FLOW, &DIVIDENDS_PAID)
}

/// Net debt / EBITDA from the snapshot.
///
/// Net debt is the reported `net_debt` when present, otherwise
/// `total_debt - total_cash`; if neither route is complete the ratio is
/// unavailable. A missing or zero EBITDA is also unavailable.
#[must_use]
pub fn net_debt_to_ebitda(snapshot: &CompanySnapshot) -> CreditMetric {
    let ebitda = match snapshot.ebitda {
        Some(e) if e != 0.0 => e,
        _ => return CreditMetric::Unavailable,
    };

    let net_debt = match (snapshot.net_debt, snapshot.total_debt, snapshot.total_cash) {
        (Some(nd), _, _) => nd,
        (None, Some(debt), Some(cash)) => debt - cash,
        _ => return CreditMetric::Unavailable,
    };

    CreditMetric::from_option(Some(net_debt / ebitda))
}

/// Dividend yield in percent.
///
/// Values up to 1 are read as fractions and scaled by 100; larger values are
/// assumed to be percentages already.
#[must_use]
pub fn dividend_yield_pct(snapshot: &CompanySnapshot) -> CreditMetric {
    CreditMetric::from_option(snapshot.dividend_yield.map(normalize_yield))
}

fn normalize_yield(raw: f64) -> f64 {
    if raw <= 1.0 { raw * 100.0 } else { raw }
}

/// The four credit metrics of one company.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    /// EBIT / |interest expense|, trailing twelve months.
    pub interest_coverage: CreditMetric,
    /// Operating cash flow / |dividends paid|, trailing twelve months.
    pub dividend_coverage: CreditMetric,
    /// Net debt / EBITDA.
    pub net_debt_to_ebitda: CreditMetric,
    /// Dividend yield in percent.
    pub dividend_yield: CreditMetric,
}

impl CreditProfile {
    /// Computes every metric from the company's statements and snapshot.
    #[must_use]
    pub fn resolve(financials: &QuarterlyFinancials, snapshot: &CompanySnapshot) -> Self {
        Self {
            interest_coverage: interest_coverage_ttm(Some(&financials.income)),
            dividend_coverage: dividend_coverage_ttm(Some(&financials.cash_flow)),
            net_debt_to_ebitda: net_debt_to_ebitda(snapshot),
            dividend_yield: dividend_yield_pct(snapshot),
        }
    }
}
