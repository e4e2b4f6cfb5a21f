//! Error types for notification delivery.

use thiserror::Error;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while delivering a push notification.
///
/// The dispatcher treats these the same as a `Rejected` outcome: the alert
/// is marked `failed` and the error never propagates further.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification auth error: {0}")]
    Auth(String),

    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Notification configuration error: {0}")]
    Config(String),
}

impl NotifyError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
