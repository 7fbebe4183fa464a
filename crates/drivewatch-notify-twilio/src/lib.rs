// # Twilio WhatsApp Sender
//
// Delivers messages through the Twilio Messages REST API on the WhatsApp
// channel. Both numbers are configured without the `whatsapp:` prefix; the
// sender adds it.
//
// Each `send()` is a single form-encoded request authenticated with the
// account SID and auth token:
//
// ```http
// POST /2010-04-01/Accounts/<sid>/Messages.json
// Authorization: Basic <sid:token>
//
// From=whatsapp:<whatsapp_number>&To=whatsapp:<target_number>&Body=<text>
// ```
//
// Any 2xx status is success; the created message SID becomes the receipt id.

use async_trait::async_trait;
use drivewatch_core::config::{MonitorConfig, TwilioConfig};
use drivewatch_core::error::SendError;
use drivewatch_core::registry::SenderRegistry;
use drivewatch_core::traits::{MessageSender, MessageSenderFactory, SendReceipt};
use serde::Deserialize;
use std::time::Duration;

/// Twilio REST API base URL
const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Channel prefix for WhatsApp addresses
const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Backend name used for registration and logging
pub const BACKEND_NAME: &str = "twilio";

/// Subset of the message resource returned on creation
#[derive(Debug, Deserialize)]
struct CreatedMessage {
    sid: Option<String>,
}

/// Twilio WhatsApp sender
pub struct TwilioSender {
    account_sid: String,
    /// ⚠️ NEVER log this value
    auth_token: String,
    from: String,
    to: String,
    base_url: String,
    client: reqwest::Client,
    dry_run: bool,
}

impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<REDACTED>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl TwilioSender {
    /// Create a sender from the `[twilio]` section
    ///
    /// Empty fields are accepted here and reported by `send()`.
    pub fn from_config(config: &TwilioConfig, dry_run: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            account_sid: config.account_sid.trim().to_string(),
            auth_token: config.auth_token.trim().to_string(),
            from: config.whatsapp_number.trim().to_string(),
            to: config.target_number.trim().to_string(),
            base_url: TWILIO_API_BASE.to_string(),
            client,
            dry_run,
        }
    }

    /// Point the sender at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("account_sid", &self.account_sid),
            ("auth_token", &self.auth_token),
            ("whatsapp_number", &self.from),
            ("target_number", &self.to),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send(&self, text: &str) -> Result<SendReceipt, SendError> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(SendError::IncompleteConfig {
                backend: BACKEND_NAME,
                missing,
            });
        }

        let from = format!("{}{}", WHATSAPP_PREFIX, self.from);
        let to = format!("{}{}", WHATSAPP_PREFIX, self.to);

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send WhatsApp message {} -> {}: {}", from, to, text);
            return Ok(SendReceipt::default());
        }

        let params = [("From", from.as_str()), ("To", to.as_str()), ("Body", text)];
        let response = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| SendError::transport(BACKEND_NAME, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        if !status.is_success() {
            return Err(SendError::Rejected {
                backend: BACKEND_NAME,
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedMessage = serde_json::from_str(&body)
            .map_err(|e| SendError::invalid_response(BACKEND_NAME, e.to_string()))?;

        Ok(created.sid.map(SendReceipt::with_id).unwrap_or_default())
    }

    fn sender_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Factory for creating Twilio senders
pub struct TwilioFactory;

impl MessageSenderFactory for TwilioFactory {
    fn create(&self, config: &MonitorConfig) -> drivewatch_core::Result<Box<dyn MessageSender>> {
        if config.general.dry_run {
            tracing::warn!("Twilio sender running in DRY-RUN mode - no messages will be sent");
        }
        Ok(Box::new(TwilioSender::from_config(
            &config.twilio,
            config.general.dry_run,
        )))
    }
}

/// Register the Twilio sender with a registry
pub fn register(registry: &mut SenderRegistry) {
    registry.register_sender(BACKEND_NAME, Box::new(TwilioFactory));
}
