#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/infradash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Message splitting.
pub mod chunk;
/// Notification errors.
pub mod error;
/// HTML escaping.
pub mod html;
/// Bot API client.
pub mod sender;

pub use chunk::{MAX_MESSAGE_CHARS, split_message};
pub use error::{NotificationError, NotificationResult};
pub use html::escape_html;
pub use sender::{NotificationSender, TelegramConfig, TelegramSender};
