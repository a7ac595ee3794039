//! SMS delivery
//!
//! The dispatcher never returns an error: every outcome, including transport
//! failures, is folded into a [`DeliveryResult`] so that deferred callers
//! (scheduled reminders) have nothing to propagate.

mod gateway;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub use gateway::SmsGatewayDispatcher;

/// Number of characters of the gateway response echoed back in a success detail
pub const RESPONSE_PREVIEW_CHARS: usize = 50;

/// Outcome of a single SMS delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    /// Whether the gateway accepted the message
    pub delivered: bool,
    /// HTTP status returned by the gateway, if a response was received
    pub status_code: Option<u16>,
    /// Human-readable summary suitable for returning to API clients
    pub detail: String,
}

impl DeliveryResult {
    /// Build a successful result from the gateway status and response body
    pub fn success(status_code: u16, body: &str) -> Self {
        let preview: String = body.chars().take(RESPONSE_PREVIEW_CHARS).collect();
        Self {
            delivered: true,
            status_code: Some(status_code),
            detail: format!("SMS Success! Status: {}. Response: {}...", status_code, preview),
        }
    }

    /// Build a failed result from any error description
    pub fn failure(status_code: Option<u16>, error: impl fmt::Display) -> Self {
        Self {
            delivered: false,
            status_code,
            detail: format!("SMS API Error: {}", error),
        }
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// Sends one SMS to one recipient
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    /// Deliver `message_body` to `recipient_number`
    async fn send_alert(&self, recipient_number: &str, message_body: &str) -> DeliveryResult;
}
