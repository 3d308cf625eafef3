#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Seen-ID stores for the tender alert.
//!
//! This crate provides implementations of the [`SeenStore`] trait from `infradash-core`:
//!
//! - [`FileSeenStore`] - Flat text file, one ID per line (default)
//! - [`InMemorySeenStore`] - Process-local set for testing and dry runs
//! - [`SqliteSeenStore`] - SQLite table (requires `sqlite` feature)

/// Flat-file store implementation.
pub mod file;
/// In-memory store implementation.
pub mod memory;

/// SQLite-based store implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use infradash_core::{SeenSet, SeenStore};

// Re-export implementations
pub use file::{DEFAULT_SEEN_FILE, FileSeenStore};
pub use memory::InMemorySeenStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSeenStore;
