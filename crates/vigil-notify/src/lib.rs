//! FCM push notification delivery.
//!
//! The dispatcher sees notifications through the [`Notifier`] trait and two
//! outcomes: delivered or not. `Rejected` and transport errors are treated
//! identically downstream; neither propagates past the dispatcher.

pub mod error;
pub mod fcm;
pub mod token;

pub use error::{NotifyError, NotifyResult};
pub use fcm::{FcmClient, NotifyConfig};

use std::collections::HashMap;

/// Outcome of a delivery attempt that reached a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The push service accepted the message.
    Delivered,
    /// The push service refused the message (bad token, 4xx) or there was
    /// no token to send to.
    Rejected,
}

/// Push notification sender.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt exactly one delivery to a device token.
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> NotifyResult<DeliveryOutcome>;
}
