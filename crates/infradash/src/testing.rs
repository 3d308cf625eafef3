//! Canned providers for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;

use infradash_core::{
    CompanySnapshot, DataError, DataFrequency, DataProvider, FundamentalDataProvider,
    PriceDataProvider, QuarterlyFinancials, Result, Symbol,
};

const DAILY: &[DataFrequency] = &[DataFrequency::Daily];

/// Provider that fails every call with a network error.
#[derive(Debug)]
pub(crate) struct FailingProvider;

impl DataProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        DAILY
    }
}

#[async_trait]
impl PriceDataProvider for FailingProvider {
    async fn fetch_ohlcv(
        &self,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
        _frequency: DataFrequency,
    ) -> Result<DataFrame> {
        Err(DataError::Network("connection refused".into()))
    }
}

#[async_trait]
impl FundamentalDataProvider for FailingProvider {
    async fn fetch_quarterly_financials(&self, _symbol: &Symbol) -> Result<QuarterlyFinancials> {
        Err(DataError::Network("connection refused".into()))
    }

    async fn fetch_snapshot(&self, _symbol: &Symbol) -> Result<CompanySnapshot> {
        Err(DataError::Network("connection refused".into()))
    }
}

/// Provider serving fixed data per symbol.
///
/// Unknown symbols get an empty snapshot and empty statements, but no prices.
#[derive(Debug, Default)]
pub(crate) struct StaticProvider {
    prices: HashMap<Symbol, DataFrame>,
    financials: HashMap<Symbol, QuarterlyFinancials>,
    snapshots: HashMap<Symbol, CompanySnapshot>,
}

impl StaticProvider {
    pub(crate) fn with_closes(mut self, symbol: &str, start_day: i32, closes: &[f64]) -> Self {
        self.prices
            .insert(Symbol::new(symbol), price_frame(start_day, closes));
        self
    }

    pub(crate) fn with_financials(mut self, financials: QuarterlyFinancials) -> Self {
        self.financials
            .insert(financials.symbol.clone(), financials);
        self
    }

    pub(crate) fn with_snapshot(mut self, snapshot: CompanySnapshot) -> Self {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
        self
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn description(&self) -> &str {
        "Fixed test data"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        DAILY
    }
}

#[async_trait]
impl PriceDataProvider for StaticProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
        _frequency: DataFrequency,
    ) -> Result<DataFrame> {
        self.prices
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }
}

#[async_trait]
impl FundamentalDataProvider for StaticProvider {
    async fn fetch_quarterly_financials(&self, symbol: &Symbol) -> Result<QuarterlyFinancials> {
        Ok(self
            .financials
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| QuarterlyFinancials::new(symbol.clone())))
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        Ok(self
            .snapshots
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| CompanySnapshot::new(symbol.clone())))
    }
}

/// A `date`/`close` frame with consecutive days from `start_day`.
pub(crate) fn price_frame(start_day: i32, closes: &[f64]) -> DataFrame {
    let dates: Vec<i32> = (0..closes.len() as i32).map(|i| start_day + i).collect();
    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .unwrap(),
        Column::new("close".into(), closes.to_vec()),
    ])
    .unwrap()
}
