//! Trailing-twelve-month aggregation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use infradash_core::{PeriodType, StatementRow};
use tracing::debug;

/// Number of quarterly periods in a trailing twelve month window.
pub const TTM_QUARTERS: usize = PeriodType::Quarterly.periods_per_year();

/// Parses a period label as a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
#[must_use]
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(label, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(label)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Sums the `n` most recent periods of a row.
///
/// Periods are ordered most recent first by their parsed dates. If any label
/// is not a date the row's own order is used instead. Rows with fewer than `n`
/// periods are summed as they are, so the result may cover less than a year.
///
/// Returns `None` for a missing or empty row.
#[must_use]
pub fn ttm_sum(row: Option<&StatementRow>, n: usize) -> Option<f64> {
    let row = row.filter(|r| !r.is_empty())?;

    let dated: Option<Vec<(NaiveDate, f64)>> = row
        .values
        .iter()
        .map(|pv| parse_period(&pv.period).map(|d| (d, pv.value)))
        .collect();

    let ordered: Vec<f64> = match dated {
        Some(mut dated) => {
            dated.sort_by(|a, b| b.0.cmp(&a.0));
            dated.into_iter().map(|(_, v)| v).collect()
        }
        None => {
            debug!(label = %row.label, "Unparseable period label, keeping provider order");
            row.values.iter().map(|pv| pv.value).collect()
        }
    };

    Some(ordered.iter().take(n.min(ordered.len())).sum())
}
