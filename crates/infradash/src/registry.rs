//! Data provider registry for managing multiple providers with fallback behavior.

use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use infradash_core::{
    CompanySnapshot, DataError, DataFrequency, DataProvider, FundamentalDataProvider,
    PriceDataProvider, QuarterlyFinancials, Result, Symbol,
};

/// Registry for managing multiple data providers with automatic fallback.
///
/// Price and fundamental providers are registered separately and tried in
/// registration order until one succeeds. The last error is returned when
/// all of them fail.
///
/// # Example
///
/// ```rust,ignore
/// use infradash::{DataProviderRegistry, Symbol, DataFrequency};
/// use chrono::NaiveDate;
///
/// let registry = DataProviderRegistry::new()
///     .with_yahoo()
///     .with_fmp("your_api_key");
///
/// let symbol = Symbol::new("KMI");
/// let data = registry.fetch_ohlcv(
///     &symbol,
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     DataFrequency::Daily,
/// ).await?;
/// ```
#[derive(Default)]
pub struct DataProviderRegistry {
    price_providers: Vec<Arc<dyn PriceDataProvider>>,
    fundamental_providers: Vec<Arc<dyn FundamentalDataProvider>>,
}

impl std::fmt::Debug for DataProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProviderRegistry")
            .field("price_providers", &self.price_provider_names())
            .field("fundamental_providers", &self.fundamental_provider_names())
            .finish()
    }
}

/// Runs `op` against each provider in turn, returning the first success.
async fn first_success<P, T, F, Fut>(
    providers: &[Arc<P>],
    what: &str,
    symbol: &Symbol,
    op: F,
) -> Result<T>
where
    P: ?Sized + DataProvider,
    F: Fn(Arc<P>) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    if providers.is_empty() {
        return Err(DataError::ProviderNotConfigured(format!(
            "No providers registered for {what}"
        )));
    }

    let mut last_error = None;
    for provider in providers {
        debug!(provider = provider.name(), symbol = %symbol, "Fetching {}", what);

        match op(Arc::clone(provider)).await {
            Ok(data) => return Ok(data),
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    symbol = %symbol,
                    error = %e,
                    "Provider failed, trying next"
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| DataError::Other("All providers failed with no error".to_string())))
}

impl DataProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price data provider.
    pub fn register_price(&mut self, provider: Arc<dyn PriceDataProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.price_providers.push(provider);
    }

    /// Register a fundamental data provider.
    pub fn register_fundamental(&mut self, provider: Arc<dyn FundamentalDataProvider>) {
        debug!(
            provider = provider.name(),
            "Registering fundamental provider"
        );
        self.fundamental_providers.push(provider);
    }

    /// Names of the registered price providers, in fallback order.
    pub fn price_provider_names(&self) -> Vec<&str> {
        self.price_providers.iter().map(|p| p.name()).collect()
    }

    /// Names of the registered fundamental providers, in fallback order.
    pub fn fundamental_provider_names(&self) -> Vec<&str> {
        self.fundamental_providers.iter().map(|p| p.name()).collect()
    }

    /// Fetch price history, trying providers in order until one succeeds.
    pub async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame> {
        first_success(&self.price_providers, "price history", symbol, |p| async move {
            p.fetch_ohlcv(symbol, start, end, frequency).await
        })
        .await
    }

    /// Fetch quarterly income and cash-flow statements.
    ///
    /// A provider that answers with no rows at all counts as failed, so the
    /// next one is tried.
    pub async fn fetch_quarterly_financials(&self, symbol: &Symbol) -> Result<QuarterlyFinancials> {
        first_success(
            &self.fundamental_providers,
            "quarterly statements",
            symbol,
            |p| async move {
                let financials = p.fetch_quarterly_financials(symbol).await?;
                if financials.is_empty() {
                    return Err(DataError::not_available(symbol, "quarterly statements"));
                }
                Ok(financials)
            },
        )
        .await
    }

    /// Fetch the company summary snapshot.
    pub async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        first_success(&self.fundamental_providers, "snapshot", symbol, |p| async move {
            p.fetch_snapshot(symbol).await
        })
        .await
    }

    // Builder methods for easy setup with specific providers

    /// Add the Yahoo Finance provider for prices and fundamentals.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        let provider = Arc::new(infradash_yahoo::YahooProvider::new());
        self.register_price(provider.clone());
        self.register_fundamental(provider);
        self
    }

    /// Add the Financial Modeling Prep provider for prices and fundamentals.
    #[cfg(feature = "fmp")]
    #[must_use]
    pub fn with_fmp(mut self, api_key: &str) -> Self {
        let provider = Arc::new(infradash_fmp::FmpProvider::new(api_key));
        self.register_price(provider.clone());
        self.register_fundamental(provider);
        self
    }
}
