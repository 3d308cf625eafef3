#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fallback provider backed by the [Financial Modeling
//! Prep](https://financialmodelingprep.com/) stable API.
//!
//! Statements come from `income-statement` and `cash-flow-statement`; the
//! snapshot is stitched together from `quote`, `key-metrics-ttm`,
//! `ratios-ttm`, `price-target-consensus` and the latest balance sheet.
//!
//! ```rust,ignore
//! use infradash_core::{FundamentalDataProvider, Symbol};
//! use infradash_fmp::FmpProvider;
//!
//! let provider = FmpProvider::new(std::env::var("FMP_API_KEY")?);
//! let snapshot = provider.fetch_snapshot(&Symbol::new("WMB")).await?;
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use infradash_core::{
    CompanySnapshot, DataError, DataFrequency, DataProvider, FundamentalDataProvider, PeriodType,
    PriceDataProvider, QuarterlyFinancials, Result, Statement, Symbol, humanize_label,
};
use polars::prelude::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

const SUPPORTED_FREQUENCIES: &[DataFrequency] = &[DataFrequency::Daily];

/// Number of quarters requested per statement.
const STATEMENT_LIMIT: usize = 8;

/// Statement fields that are numeric but not line items.
const STATEMENT_META_KEYS: &[&str] = &["cik", "fiscalYear", "calendarYear"];

/// Financial Modeling Prep provider for daily closes, quarterly statements
/// and the company snapshot. Needs an API key.
#[derive(Clone)]
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for FmpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FmpProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl FmpProvider {
    /// Provider with a 30 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self::with_client(client, api_key)
    }

    /// Provider on a caller-supplied client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL for `endpoint`, which may already carry a query string.
    fn url(&self, endpoint: &str) -> String {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        format!("{}/{endpoint}{sep}apikey={}", self.base_url, self.api_key)
    }

    /// GET `endpoint` and decode the body.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        // The key is part of the URL, so only the endpoint is logged
        debug!(endpoint, "FMP request");

        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: "FMP".to_string(),
                retry_after: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(DataError::Network(format!("HTTP {status} from {endpoint}: {body}")));
        }

        // Bad keys and plan limits come back as 200 with an error object
        if body.contains("\"Error Message\"") {
            return Err(DataError::Network(body));
        }

        serde_json::from_str(&body).map_err(|e| DataError::Parse(format!("{endpoint}: {e}")))
    }

    /// Fetch one statement type as raw per-period records.
    async fn fetch_statement_records(
        &self,
        statement: &str,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<Map<String, Value>>> {
        let endpoint = format!(
            "{statement}?symbol={}&period=quarter&limit={limit}",
            symbol.as_str()
        );
        self.get(&endpoint).await
    }

    /// Fetch a single-record endpoint such as `quote` or `key-metrics-ttm`.
    ///
    /// FMP answers these with a one-element array.
    async fn fetch_first<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: &Symbol,
    ) -> Result<T> {
        let records: Vec<T> = self
            .get(&format!("{endpoint}?symbol={}", symbol.as_str()))
            .await?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }

    /// Like [`fetch_first`](Self::fetch_first), but a failure only drops the
    /// fields this endpoint would have filled.
    async fn fetch_optional<T>(&self, endpoint: &str, symbol: &Symbol) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.fetch_first(endpoint, symbol).await {
            Ok(record) => record,
            Err(e) => {
                warn!(symbol = %symbol, endpoint, error = %e, "FMP snapshot component unavailable");
                T::default()
            }
        }
    }

    /// End-of-day closes between `from` and `to`, newest first.
    async fn fetch_eod_closes(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FmpEodClose>> {
        let endpoint = format!(
            "historical-price-eod/light?symbol={}&from={from}&to={to}",
            symbol.as_str()
        );
        self.get(&endpoint).await
    }
}

impl DataProvider for FmpProvider {
    fn name(&self) -> &str {
        "FMP"
    }

    fn description(&self) -> &str {
        "Financial Modeling Prep statements, TTM metrics and daily closes"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        SUPPORTED_FREQUENCIES
    }
}

#[async_trait]
impl PriceDataProvider for FmpProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame> {
        if !SUPPORTED_FREQUENCIES.contains(&frequency) {
            return Err(DataError::InvalidParameter(format!(
                "{frequency:?} bars are not served by FMP"
            )));
        }

        let closes = self.fetch_eod_closes(symbol, start, end).await?;
        closes_to_frame(symbol, &closes)
    }
}

#[async_trait]
impl FundamentalDataProvider for FmpProvider {
    async fn fetch_quarterly_financials(&self, symbol: &Symbol) -> Result<QuarterlyFinancials> {
        let income = self
            .fetch_statement_records("income-statement", symbol, STATEMENT_LIMIT)
            .await?;
        let cash_flow = self
            .fetch_statement_records("cash-flow-statement", symbol, STATEMENT_LIMIT)
            .await?;

        let mut financials = QuarterlyFinancials::new(symbol.clone());
        financials.income = statement_from_records(&income);
        financials.cash_flow = statement_from_records(&cash_flow);

        if financials.is_empty() {
            return Err(DataError::not_available(symbol, "quarterly statements"));
        }
        Ok(financials)
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        let quote: FmpQuote = self.fetch_first("quote", symbol).await?;
        let metrics: FmpKeyMetricsTtm = self.fetch_optional("key-metrics-ttm", symbol).await;
        let ratios: FmpRatiosTtm = self.fetch_optional("ratios-ttm", symbol).await;
        let target: FmpPriceTarget = self.fetch_optional("price-target-consensus", symbol).await;

        let balance: FmpBalanceSheet = match self
            .fetch_statement_records("balance-sheet-statement", symbol, 1)
            .await
            .and_then(|records| latest_balance_sheet(symbol, records))
        {
            Ok(record) => record,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "FMP balance sheet unavailable");
                FmpBalanceSheet::default()
            }
        };

        let income = match self
            .fetch_statement_records("income-statement", symbol, 4)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "FMP quarterly EBITDA unavailable");
                Vec::new()
            }
        };

        Ok(CompanySnapshot {
            symbol: symbol.clone(),
            current_price: quote.price,
            enterprise_to_ebitda: metrics.ev_to_ebitda_ttm,
            return_on_equity: metrics.return_on_equity_ttm,
            target_mean_price: target.target_consensus,
            total_debt: balance.total_debt,
            total_cash: balance.cash_and_cash_equivalents,
            ebitda: trailing_ebitda(&income),
            net_debt: balance.net_debt,
            dividend_yield: ratios.dividend_yield_ttm,
        })
    }
}

fn latest_balance_sheet(
    symbol: &Symbol,
    records: Vec<Map<String, Value>>,
) -> Result<FmpBalanceSheet> {
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| DataError::not_available(symbol, "balance sheet"))?;
    serde_json::from_value(Value::Object(record)).map_err(|e| DataError::Parse(e.to_string()))
}

/// EBITDA over the last four reported quarters.
///
/// Only a complete year counts; a shorter history yields `None`.
fn trailing_ebitda(records: &[Map<String, Value>]) -> Option<f64> {
    let quarters: Vec<f64> = records
        .iter()
        .take(4)
        .filter_map(|r| r.get("ebitda").and_then(Value::as_f64))
        .collect();
    (quarters.len() == 4).then(|| quarters.iter().sum())
}

/// Turns flat per-period records into statement rows.
///
/// Every numeric field becomes a row under its humanized key, keeping the
/// field order of the first record. The period label is the record's `date`.
fn statement_from_records(records: &[Map<String, Value>]) -> Statement {
    let mut statement = Statement::new(PeriodType::Quarterly);

    for record in records {
        let Some(period) = record.get("date").and_then(Value::as_str) else {
            debug!("Skipping FMP record without date");
            continue;
        };

        for (key, value) in record {
            if STATEMENT_META_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(v) = value.as_f64() {
                statement.insert(&humanize_label(key), period, v);
            }
        }
    }

    statement
}

/// `date`/`close` frame in ascending date order. Rows with unparseable
/// dates are dropped.
fn closes_to_frame(symbol: &Symbol, closes: &[FmpEodClose]) -> Result<DataFrame> {
    let (days, values): (Vec<i32>, Vec<f64>) = closes
        .iter()
        .filter_map(|c| {
            NaiveDate::parse_from_str(&c.date, "%Y-%m-%d")
                .ok()
                .map(|d| (days_since_epoch(d), c.price))
        })
        .unzip();

    if days.is_empty() {
        return Err(DataError::not_available(symbol, "price history"));
    }

    DataFrame::new(vec![
        Column::new("date".into(), days),
        Column::new("close".into(), values),
    ])
    .and_then(|df| {
        df.lazy()
            .with_column(col("date").cast(DataType::Date))
            .sort(["date"], Default::default())
            .collect()
    })
    .map_err(|e| DataError::Parse(e.to_string()))
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - DateTime::UNIX_EPOCH.date_naive()).num_days() as i32
}

// Wire types.

/// FMP Quote response.
#[derive(Debug, Clone, Deserialize)]
struct FmpQuote {
    price: Option<f64>,
}

/// FMP TTM key metrics response.
#[derive(Debug, Clone, Default, Deserialize)]
struct FmpKeyMetricsTtm {
    #[serde(rename = "evToEBITDATTM")]
    ev_to_ebitda_ttm: Option<f64>,
    #[serde(rename = "returnOnEquityTTM")]
    return_on_equity_ttm: Option<f64>,
}

/// FMP TTM ratios response.
#[derive(Debug, Clone, Default, Deserialize)]
struct FmpRatiosTtm {
    #[serde(rename = "dividendYieldTTM")]
    dividend_yield_ttm: Option<f64>,
}

/// FMP analyst price target consensus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpPriceTarget {
    target_consensus: Option<f64>,
}

/// FMP Balance Sheet response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpBalanceSheet {
    total_debt: Option<f64>,
    cash_and_cash_equivalents: Option<f64>,
    net_debt: Option<f64>,
}

/// One row of `historical-price-eod/light`.
#[derive(Debug, Clone, Deserialize)]
struct FmpEodClose {
    date: String,
    price: f64,
}
