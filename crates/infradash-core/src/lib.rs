#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the infradash credit dashboard.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Closing price history
//! - [`FundamentalDataProvider`](provider::FundamentalDataProvider) - Statements and snapshots
//! - [`SeenStore`](seen::SeenStore) - Persistent set of forwarded identifiers

/// Error types for data operations.
pub mod error;
/// Data frequency and period type definitions.
pub mod frequency;
/// Provider traits for fetching market data.
pub mod provider;
/// Seen-ID store trait.
pub mod seen;
/// Core data types (Symbol, Statement, CompanySnapshot, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use frequency::{DataFrequency, PeriodType};
pub use provider::{DataProvider, FundamentalDataProvider, PriceDataProvider};
pub use seen::{SeenSet, SeenStore};
pub use types::{
    CompanySnapshot, PeriodValue, QuarterlyFinancials, Statement, StatementRow, Symbol,
    humanize_label,
};
