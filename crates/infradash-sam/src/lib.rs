#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// HTTP client and posting type.
pub mod client;
/// Posting selection.
pub mod filter;

pub use client::{DEFAULT_LIMIT, Opportunity, SamClient};
pub use filter::{DEFAULT_MIN_DESCRIPTION_CHARS, DEFAULT_TARGET_AGENCIES, TenderFilter};
