//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when fetching market data, resolving credit metrics, persisting seen IDs or
//! delivering a report.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Data is not available for the requested symbol.
    #[error("Data not available for {symbol}: {what}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// What was missing (e.g. "price history", "financial statements").
        what: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error reading or writing the seen-ID store.
    #[error("Store error: {0}")]
    Store(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A required credential (API key, bot token) is not set.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    /// The report or alert could not be delivered.
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Shorthand for [`DataError::DataNotAvailable`].
    #[must_use]
    pub fn not_available(symbol: impl ToString, what: impl Into<String>) -> Self {
        Self::DataNotAvailable {
            symbol: symbol.to_string(),
            what: what.into(),
        }
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
