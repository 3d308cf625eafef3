//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`PriceDataProvider`] - Daily closing price history
//! - [`FundamentalDataProvider`] - Quarterly statements and the summary snapshot

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::Result,
    frequency::DataFrequency,
    types::{CompanySnapshot, QuarterlyFinancials, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider and its capabilities.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the data frequencies supported by this provider.
    fn supported_frequencies(&self) -> &[DataFrequency];
}

/// Provider for price history.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches price history for a single symbol.
    ///
    /// Returns a DataFrame with at least the columns `date` (Date) and
    /// `close` (f64), sorted by ascending date. Closes may be null on days the
    /// provider has no print.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame>;
}

/// Provider for fundamental financial data.
#[async_trait]
pub trait FundamentalDataProvider: DataProvider {
    /// Fetches the quarterly income and cash-flow statements for a symbol.
    ///
    /// Row labels are provider-defined free text. Statements may be empty when
    /// the provider has nothing for the symbol.
    async fn fetch_quarterly_financials(&self, symbol: &Symbol) -> Result<QuarterlyFinancials>;

    /// Fetches the summary snapshot (valuation, debt, cash, EBITDA, yield).
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot>;
}
