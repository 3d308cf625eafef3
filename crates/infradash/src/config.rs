//! Watchlist tables and environment configuration.

use std::path::PathBuf;

use infradash_core::{DataError, Result, Symbol};
use infradash_store::DEFAULT_SEEN_FILE;
use infradash_telegram::TelegramConfig;

/// Environment variable for the optional FMP key.
pub const FMP_API_KEY_VAR: &str = "FMP_API_KEY";

/// Environment variable overriding the seen-ID file.
pub const SEEN_FILE_VAR: &str = "INFRADASH_SEEN_FILE";

/// A company covered by the credit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCompany {
    /// Ticker.
    pub symbol: Symbol,
    /// Agency credit rating shown next to the ticker.
    pub rating: String,
}

impl TrackedCompany {
    /// Creates an entry.
    pub fn new(symbol: &str, rating: &str) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            rating: rating.to_string(),
        }
    }
}

/// How a macro instrument's daily move is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStyle {
    /// Relative change in percent.
    Percent,
    /// Absolute change in basis points, for instruments quoted as a yield.
    BasisPoints,
}

/// A macro instrument in the report header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInstrument {
    /// Ticker.
    pub symbol: Symbol,
    /// Display name.
    pub name: String,
    /// Change presentation.
    pub style: ChangeStyle,
}

impl MacroInstrument {
    /// Creates an entry.
    pub fn new(symbol: &str, name: &str, style: ChangeStyle) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            name: name.to_string(),
            style,
        }
    }
}

/// Everything the credit report covers.
///
/// Built once and passed by reference; nothing mutates it during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    /// Companies in report order.
    pub companies: Vec<TrackedCompany>,
    /// Macro instruments in report order.
    pub macro_instruments: Vec<MacroInstrument>,
    /// Index used for beta and correlation.
    pub benchmark: Symbol,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self {
            companies: vec![
                TrackedCompany::new("KMI", "BBB"),
                TrackedCompany::new("WMB", "BBB"),
                TrackedCompany::new("LNG", "BBB"),
            ],
            macro_instruments: vec![
                MacroInstrument::new("NG=F", "Natural Gas", ChangeStyle::Percent),
                MacroInstrument::new("^TNX", "US 10Y Yield", ChangeStyle::BasisPoints),
                MacroInstrument::new("DX-Y.NYB", "Dollar Index", ChangeStyle::Percent),
                MacroInstrument::new("^GSPC", "S&P 500", ChangeStyle::Percent),
                MacroInstrument::new("CL=F", "WTI Crude", ChangeStyle::Percent),
            ],
            benchmark: Symbol::new("^GSPC"),
        }
    }
}

/// Settings read from the environment.
///
/// Credentials are optional here; each workflow asks for what it needs with
/// the `require_*` methods before making any network call.
#[derive(Debug, Clone)]
pub struct AppConfig {
    telegram: Option<TelegramConfig>,
    sam_api_key: Option<String>,
    /// Optional Financial Modeling Prep key; enables the fallback provider.
    pub fmp_api_key: Option<String>,
    /// Seen-ID file for the tender alert.
    pub seen_file: PathBuf,
}

impl AppConfig {
    /// Reads every setting through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            telegram: TelegramConfig::from_lookup(&lookup).ok(),
            sam_api_key: read(infradash_sam::client::API_KEY_VAR),
            fmp_api_key: read(FMP_API_KEY_VAR),
            seen_file: read(SEEN_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_FILE)),
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Telegram settings, or [`DataError::MissingCredential`].
    ///
    /// # Errors
    /// Fails when `TELEGRAM_TOKEN` or `CHAT_ID` is unset.
    pub fn require_telegram(&self) -> Result<TelegramConfig> {
        self.telegram
            .clone()
            .ok_or_else(|| DataError::MissingCredential("TELEGRAM_TOKEN or CHAT_ID".to_string()))
    }

    /// The SAM.gov key, or [`DataError::MissingCredential`].
    ///
    /// # Errors
    /// Fails when `SAM_API_KEY` is unset.
    pub fn require_sam_api_key(&self) -> Result<&str> {
        self.sam_api_key
            .as_deref()
            .ok_or_else(|| DataError::MissingCredential(infradash_sam::client::API_KEY_VAR.into()))
    }
}
