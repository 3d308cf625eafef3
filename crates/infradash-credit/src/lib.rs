#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Credit-metric resolution.
//!
//! # Example
//!
//! ```
//! use infradash_core::{PeriodType, Statement, StatementRow};
//! use infradash_credit::{CreditMetric, interest_coverage_ttm};
//!
//! let income = Statement::from_rows(
//!     PeriodType::Quarterly,
//!     vec![
//!         StatementRow::new("EBIT").with_value("2024-03-31", 800.0),
//!         StatementRow::new("Interest Expense").with_value("2024-03-31", -200.0),
//!     ],
//! );
//! assert_eq!(interest_coverage_ttm(Some(&income)), CreditMetric::Value(4.0));
//! ```

/// Interest coverage health buckets.
pub mod label;
/// Derived ratios and the per-company profile.
pub mod metrics;
/// Prioritized line-item matching.
pub mod query;
/// Trailing-twelve-month sums.
pub mod ttm;

pub use label::CoverageLabel;
pub use metrics::{
    CreditMetric, CreditProfile, dividend_coverage_ttm, dividend_yield_pct,
    interest_coverage_ttm, net_debt_to_ebitda,
};
pub use query::{LineItemQuery, resolve_row};
pub use ttm::{TTM_QUARTERS, parse_period, ttm_sum};
