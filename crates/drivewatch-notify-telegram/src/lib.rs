// # Telegram Message Sender
//
// This crate provides the Telegram bot API backend for drivewatch.
//
// It is used two ways:
//
// - as a regular alert backend when `general.alert_service = "telegram"`
// - as the status backend for startup/shutdown messages, always
//
// ## Behavior
//
// - One `POST /bot<token>/sendMessage` per `send()`, form-encoded
//   (`chat_id`, `text`)
// - HTTP 200 is success; any other status is a failure carrying the body
// - Missing `bot_token` or `chat_id` fails the send without any network call
// - No retries, no background tasks
//
// ## Security Requirements
//
// - The bot token is part of the request path; it is never logged and never
//   included in error messages

use async_trait::async_trait;
use drivewatch_core::config::{MonitorConfig, TelegramConfig};
use drivewatch_core::error::SendError;
use drivewatch_core::registry::SenderRegistry;
use drivewatch_core::traits::{MessageSender, MessageSenderFactory, SendReceipt};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Telegram bot API base URL
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend name used for registration and logging
pub const BACKEND_NAME: &str = "telegram";

/// Telegram bot API sender
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the sender logs the message it would send and
/// reports success without contacting Telegram.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bot token.
pub struct TelegramSender {
    /// Bot token
    /// ⚠️ NEVER log this value
    bot_token: String,

    /// Destination chat
    chat_id: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: log instead of sending
    dry_run: bool,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSender")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl TelegramSender {
    /// Create a new Telegram sender
    ///
    /// Empty credentials are accepted here and reported by `send()`.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>, dry_run: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
            client,
            dry_run,
        }
    }

    /// Create a sender from the `[telegram]` section
    pub fn from_config(config: &TelegramConfig, dry_run: bool) -> Self {
        Self::new(config.bot_token.trim(), config.chat_id.trim(), dry_run)
    }

    /// Point the sender at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Names of the credentials that are missing
    fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bot_token.is_empty() {
            missing.push("bot_token");
        }
        if self.chat_id.is_empty() {
            missing.push("chat_id");
        }
        missing
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    /// Send `text` to the configured chat
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /bot<token>/sendMessage
    /// Content-Type: application/x-www-form-urlencoded
    ///
    /// chat_id=<chat>&text=<text>
    /// ```
    async fn send(&self, text: &str) -> Result<SendReceipt, SendError> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(SendError::IncompleteConfig {
                backend: BACKEND_NAME,
                missing,
            });
        }

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send Telegram message to chat {}: {}",
                self.chat_id,
                text
            );
            return Ok(SendReceipt::default());
        }

        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];
        let response = self
            .client
            .post(self.endpoint())
            .form(&params)
            .send()
            .await
            // without_url keeps the token-bearing URL out of the message
            .map_err(|e| SendError::transport(BACKEND_NAME, e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        if status != StatusCode::OK {
            return Err(SendError::Rejected {
                backend: BACKEND_NAME,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Telegram accepted message for chat {}", self.chat_id);
        Ok(message_id(&body).map(SendReceipt::with_id).unwrap_or_default())
    }

    fn sender_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Pull `result.message_id` out of a sendMessage response, if present
fn message_id(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["result"]["message_id"].as_i64().map(|id| id.to_string())
}

/// Factory for creating Telegram senders
pub struct TelegramFactory;

impl MessageSenderFactory for TelegramFactory {
    fn create(&self, config: &MonitorConfig) -> drivewatch_core::Result<Box<dyn MessageSender>> {
        if config.general.dry_run {
            tracing::warn!("Telegram sender running in DRY-RUN mode - no messages will be sent");
        }
        Ok(Box::new(TelegramSender::from_config(
            &config.telegram,
            config.general.dry_run,
        )))
    }
}

/// Register the Telegram sender with a registry
///
/// # Example
///
/// ```rust
/// use drivewatch_core::SenderRegistry;
///
/// let mut registry = SenderRegistry::new();
/// drivewatch_notify_telegram::register(&mut registry);
/// assert!(registry.has_sender("telegram"));
/// ```
pub fn register(registry: &mut SenderRegistry) {
    registry.register_sender(BACKEND_NAME, Box::new(TelegramFactory));
}
