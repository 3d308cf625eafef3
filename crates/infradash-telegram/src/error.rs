//! Notification error type.

use infradash_core::DataError;

/// Result alias for notifier operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors raised while delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The endpoint answered with a non-success status.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The sender was built from unusable settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required setting is absent.
    #[error("{0} is not set")]
    MissingCredential(String),

    /// The endpoint asked us to slow down.
    #[error("Rate limited: retry after {0}s")]
    RateLimited(u64),

    /// Transport failure.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl From<NotificationError> for DataError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::MissingCredential(name) => Self::MissingCredential(name),
            other => Self::Notification(other.to_string()),
        }
    }
}
