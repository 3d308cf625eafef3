#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Energy infrastructure credit dashboard and government tender alerts.
//!
//! This crate ties the workspace together. It re-exports the core types and
//! provider implementations, provides a [`DataProviderRegistry`] with
//! automatic fallback, and implements the two workflows:
//!
//! - [`build_credit_report`] - macro trend plus per-company credit metrics
//! - [`run_tender_alert`] - new SAM.gov postings from target agencies
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance provider (prices, snapshot, statements)
//! - `fmp` - Financial Modeling Prep fallback provider
//! - `store-sqlite` - SQLite seen-ID store
//!
//! # Example
//!
//! ```rust,ignore
//! use infradash::{DataProviderRegistry, Watchlist, build_credit_report};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = DataProviderRegistry::new().with_yahoo();
//!     let now = chrono::Local::now().naive_local();
//!
//!     let report = build_credit_report(&registry, &Watchlist::default(), now).await;
//!     println!("{report}");
//! }
//! ```

// Core types and traits
pub use infradash_core::*;

// Credit metrics
pub use infradash_credit::{CoverageLabel, CreditMetric, CreditProfile};

// Seen stores
#[cfg(feature = "store-sqlite")]
pub use infradash_store::SqliteSeenStore;
pub use infradash_store::{DEFAULT_SEEN_FILE, FileSeenStore, InMemorySeenStore};

// Notification
pub use infradash_telegram::{
    NotificationError, NotificationSender, TelegramConfig, TelegramSender,
};

// Tenders
pub use infradash_sam::{Opportunity, SamClient, TenderFilter};

// Providers
#[cfg(feature = "fmp")]
pub use infradash_fmp::FmpProvider;
#[cfg(feature = "yahoo")]
pub use infradash_yahoo::YahooProvider;

/// Environment configuration and the watchlist.
pub mod config;
/// Report number formatting.
pub mod format;
/// RSI, beta and correlation.
pub mod indicators;
/// Credit dashboard report.
pub mod report;
/// Tender alert workflow.
pub mod tender;

mod registry;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, ChangeStyle, MacroInstrument, TrackedCompany, Watchlist};
pub use registry::DataProviderRegistry;
pub use report::build_credit_report;
pub use tender::{
    TenderBatch, deliver_tender_alert, prepare_tender_alert, run_tender_alert,
};
