#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance provider.
//!
//! Prices come from the v8 chart endpoint; the company snapshot and the
//! quarterly statements come from quoteSummary modules. Requests from one
//! provider are spaced at least one second apart.
//!
//! ```no_run
//! use infradash_core::{DataFrequency, PriceDataProvider, Symbol};
//! use infradash_yahoo::YahooProvider;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> infradash_core::Result<()> {
//! let provider = YahooProvider::new();
//! let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
//!
//! let closes = provider
//!     .fetch_ohlcv(&Symbol::new("KMI"), day(1, 2), day(12, 31), DataFrequency::Daily)
//!     .await?;
//! println!("{} closes", closes.height());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use infradash_core::{
    CompanySnapshot, DataError, DataFrequency, DataProvider, FundamentalDataProvider, PeriodType,
    PriceDataProvider, QuarterlyFinancials, Result, Statement, Symbol, humanize_label,
};
use polars::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// quoteSummary modules that make up the company snapshot.
const SNAPSHOT_MODULES: &str = "financialData,defaultKeyStatistics,summaryDetail,price";

/// quoteSummary modules holding quarterly statements.
const STATEMENT_MODULES: &str = "incomeStatementHistoryQuarterly,cashflowStatementHistoryQuarterly";

/// Statement keys that are metadata rather than line items.
const STATEMENT_META_KEYS: &[&str] = &["endDate", "maxAge"];

/// Yahoo rejects requests without a browser-like agent.
const BROWSER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

const PROVIDER_NAME: &str = "Yahoo Finance";

const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Keeps consecutive requests at least `min_interval` apart.
#[derive(Debug)]
struct Throttle {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    async fn wait(&self) {
        let mut next = self.next_slot.lock().await;
        if let Some(at) = *next {
            let wait = at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                debug!(wait_ms = wait.as_millis() as u64, "Throttling Yahoo request");
                sleep_until(at).await;
            }
        }
        *next = Some(Instant::now() + self.min_interval);
    }
}

/// Yahoo Finance price and fundamentals provider.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    throttle: Throttle,
}

impl YahooProvider {
    /// Provider with a 30 second timeout and one request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_interval(MIN_REQUEST_INTERVAL)
    }

    /// Provider on a caller-supplied client, still throttled.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            throttle: Throttle::new(MIN_REQUEST_INTERVAL),
        }
    }

    /// Provider spacing requests `min_interval` apart.
    #[must_use]
    pub fn with_min_interval(min_interval: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            throttle: Throttle::new(min_interval),
        }
    }

    /// Chart URL covering `start` through the end of `end` (UTC).
    fn chart_url(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> String {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        format!(
            "{CHART_URL}/{}?period1={period1}&period2={period2}&interval={}",
            urlencoding::encode(symbol.as_str()),
            chart_interval(frequency)
        )
    }

    fn summary_url(&self, symbol: &Symbol, modules: &str) -> String {
        format!(
            "{SUMMARY_URL}/{}?modules={modules}",
            urlencoding::encode(symbol.as_str())
        )
    }

    /// GET a URL and decode the JSON body, mapping HTTP failures to [`DataError`].
    async fn get_json<T: DeserializeOwned>(&self, symbol: &Symbol, url: &str) -> Result<T> {
        self.throttle.wait().await;
        debug!(%url, "Yahoo request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            }),
            reqwest::StatusCode::NOT_FOUND => Err(DataError::SymbolNotFound(symbol.to_string())),
            status if !status.is_success() => {
                Err(DataError::Network(format!("HTTP {status} for {symbol}")))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| DataError::Parse(e.to_string())),
        }
    }

    async fn fetch_quote_summary(&self, symbol: &Symbol, modules: &str) -> Result<QuoteSummaryData> {
        let url = self.summary_url(symbol, modules);
        let summary: QuoteSummaryResponse = self.get_json(symbol, &url).await?;
        first_summary_result(symbol, summary)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Daily closes, company snapshot and quarterly statements from Yahoo Finance"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        &[
            DataFrequency::Hourly,
            DataFrequency::Daily,
            DataFrequency::Weekly,
            DataFrequency::Monthly,
        ]
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidParameter(format!(
                "range starts {start} after it ends {end}"
            )));
        }

        let url = self.chart_url(symbol, start, end, frequency);
        let response: ChartResponse = self.get_json(symbol, &url).await?;
        closes_from_chart(symbol, response)
    }
}

#[async_trait]
impl FundamentalDataProvider for YahooProvider {
    async fn fetch_quarterly_financials(&self, symbol: &Symbol) -> Result<QuarterlyFinancials> {
        let data = self.fetch_quote_summary(symbol, STATEMENT_MODULES).await?;

        let mut financials = QuarterlyFinancials::new(symbol.clone());
        if let Some(history) = data.income_statement_history_quarterly {
            financials.income = statement_from_periods(&history.income_statement_history);
        }
        if let Some(history) = data.cashflow_statement_history_quarterly {
            financials.cash_flow = statement_from_periods(&history.cashflow_statements);
        }

        if financials.is_empty() {
            warn!(symbol = %symbol, "Yahoo returned no quarterly statement rows");
            return Err(DataError::not_available(symbol, "quarterly statements"));
        }
        Ok(financials)
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        let data = self.fetch_quote_summary(symbol, SNAPSHOT_MODULES).await?;
        Ok(snapshot_from_summary(symbol, data))
    }
}

const fn chart_interval(frequency: DataFrequency) -> &'static str {
    match frequency {
        DataFrequency::Hourly => "1h",
        DataFrequency::Daily => "1d",
        DataFrequency::Weekly => "1wk",
        DataFrequency::Monthly => "1mo",
    }
}

/// Maps an error object embedded in a 200 response.
fn api_error(symbol: &Symbol, error: ApiError) -> DataError {
    if error.code == "Not Found" {
        DataError::SymbolNotFound(symbol.to_string())
    } else {
        DataError::Other(format!("{}: {}", error.code, error.description))
    }
}

/// Builds the `date`/`close` frame from a chart response.
///
/// Closes stay null where Yahoo has no print.
fn closes_from_chart(symbol: &Symbol, response: ChartResponse) -> Result<DataFrame> {
    if let Some(error) = response.chart.error {
        return Err(api_error(symbol, error));
    }

    let series = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

    let timestamps = series.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(DataError::not_available(symbol, "price history"));
    }

    let mut closes = series
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .ok_or_else(|| DataError::Parse(format!("chart for {symbol} has no quote block")))?;
    closes.resize(timestamps.len(), None);

    // Polars stores Date as days since the Unix epoch
    let days: Vec<i32> = timestamps
        .iter()
        .map(|&ts| ts.div_euclid(86_400) as i32)
        .collect();

    let date = Column::new("date".into(), days)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Parse(e.to_string()))?;

    DataFrame::new(vec![date, Column::new("close".into(), closes)])
        .map_err(|e| DataError::Parse(e.to_string()))
}

fn first_summary_result(symbol: &Symbol, response: QuoteSummaryResponse) -> Result<QuoteSummaryData> {
    if let Some(error) = response.quote_summary.error {
        return Err(api_error(symbol, error));
    }

    response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
}

fn snapshot_from_summary(symbol: &Symbol, data: QuoteSummaryData) -> CompanySnapshot {
    let financial = data.financial_data.unwrap_or_default();
    let stats = data.default_key_statistics.unwrap_or_default();
    let detail = data.summary_detail.unwrap_or_default();
    let price = data.price.unwrap_or_default();

    CompanySnapshot {
        symbol: symbol.clone(),
        current_price: financial
            .current_price
            .raw()
            .or_else(|| price.regular_market_price.raw()),
        enterprise_to_ebitda: stats.enterprise_to_ebitda.raw(),
        return_on_equity: financial.return_on_equity.raw(),
        target_mean_price: financial.target_mean_price.raw(),
        total_debt: financial.total_debt.raw(),
        total_cash: financial.total_cash.raw(),
        ebitda: financial.ebitda.raw(),
        net_debt: stats.net_debt.raw(),
        dividend_yield: detail.dividend_yield.raw(),
    }
}

/// Reads the period label of one statement entry.
///
/// Prefers the formatted `endDate`, falling back to the raw epoch seconds.
fn period_label(entry: &Map<String, Value>) -> Option<String> {
    let end = entry.get("endDate")?;
    if let Some(fmt) = end.get("fmt").and_then(Value::as_str) {
        return Some(fmt.to_string());
    }
    end.get("raw")
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive().to_string())
}

/// Turns quoteSummary statement entries (one object per period) into rows.
///
/// Each numeric field becomes a row labelled with its humanized key. Fields
/// whose `raw` value is missing are skipped rather than read as zero.
fn statement_from_periods(entries: &[Map<String, Value>]) -> Statement {
    let mut statement = Statement::new(PeriodType::Quarterly);

    for entry in entries {
        let Some(period) = period_label(entry) else {
            debug!("Skipping statement entry without endDate");
            continue;
        };

        for (key, value) in entry {
            if STATEMENT_META_KEYS.contains(&key.as_str()) {
                continue;
            }
            let raw = value
                .get("raw")
                .and_then(Value::as_f64)
                .or_else(|| value.as_f64());
            if let Some(raw) = raw {
                statement.insert(&humanize_label(key), &period, raw);
            }
        }
    }

    statement
}

// Wire types. Only the fields read above are declared.

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartSeries>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    financial_data: Option<FinancialData>,
    default_key_statistics: Option<KeyStatistics>,
    summary_detail: Option<SummaryDetail>,
    price: Option<PriceModule>,
    income_statement_history_quarterly: Option<IncomeStatementHistory>,
    cashflow_statement_history_quarterly: Option<CashflowStatementHistory>,
}

/// A `{ "raw": 1.23, "fmt": "1.23" }` value; Yahoo sends `{}` when absent.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

trait RawExt {
    fn raw(&self) -> Option<f64>;
}

impl RawExt for Option<RawValue> {
    fn raw(&self) -> Option<f64> {
        self.as_ref().and_then(|v| v.raw)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    current_price: Option<RawValue>,
    target_mean_price: Option<RawValue>,
    total_debt: Option<RawValue>,
    total_cash: Option<RawValue>,
    ebitda: Option<RawValue>,
    return_on_equity: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    enterprise_to_ebitda: Option<RawValue>,
    net_debt: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowStatementHistory {
    #[serde(default)]
    cashflow_statements: Vec<Map<String, Value>>,
}
