// # Message Sender Trait
//
// Defines the interface for delivering a text message through one
// messaging backend.
//
// ## Implementations
//
// - Telegram bot API: `drivewatch-notify-telegram` crate
// - Twilio WhatsApp bridge: `drivewatch-notify-twilio` crate

use async_trait::async_trait;

use crate::config::MonitorConfig;
use crate::error::SendError;

/// Proof of delivery returned by a backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendReceipt {
    /// Provider-assigned message identifier, when the provider returns one
    pub message_id: Option<String>,
}

impl SendReceipt {
    /// Receipt carrying a provider message id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            message_id: Some(id.into()),
        }
    }
}

/// Trait for message sender implementations
///
/// Each implementation owns its credentials and wire format; nothing about
/// either leaks through this interface.
///
/// # Contract
///
/// - Single-shot: one provider call per `send()`, no retries
/// - Credentials are checked at send time; missing ones yield
///   [`SendError::IncompleteConfig`] without any network traffic
/// - Credentials never appear in logs or error messages
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `text`
    ///
    /// # Returns
    ///
    /// - `Ok(SendReceipt)`: The provider accepted the message
    /// - `Err(SendError)`: The message was not delivered
    async fn send(&self, text: &str) -> Result<SendReceipt, SendError>;

    /// Get the sender name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the backend (e.g., "telegram", "twilio")
    fn sender_name(&self) -> &'static str;
}

/// Helper trait for constructing message senders from configuration
pub trait MessageSenderFactory: Send + Sync {
    /// Create a MessageSender instance from configuration
    ///
    /// Construction must not fail because credentials are missing; that is
    /// reported by `send()`.
    fn create(&self, config: &MonitorConfig) -> Result<Box<dyn MessageSender>, crate::Error>;
}
