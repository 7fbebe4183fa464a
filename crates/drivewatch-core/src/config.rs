//! Configuration types for the drivewatch system
//!
//! The configuration is read once at startup from a TOML file with the
//! sections `[general]`, `[twilio]`, `[telegram]`, `[monitor]` and
//! `[browser]`. Every section and key is optional; missing values fall back
//! to the defaults below. Missing credentials are *not* a load-time error:
//! the matching sender reports them when it is asked to send.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main drivewatch configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    /// Alert selection and target page
    #[serde(default)]
    pub general: GeneralConfig,

    /// WhatsApp-bridge credentials
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Bot API credentials
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Poll loop settings
    #[serde(default)]
    pub monitor: PollConfig,

    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl MonitorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration
    ///
    /// Only structural problems are rejected here. Credentials are checked
    /// lazily by each sender.
    pub fn validate(&self) -> Result<()> {
        self.general.validate()?;
        self.monitor.validate()?;
        self.browser.validate()?;
        Ok(())
    }
}

/// `[general]` section
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Backend used for new-item alerts (`twilio` or `telegram`, any case)
    #[serde(default = "default_alert_service")]
    pub alert_service: String,

    /// Shared drive page to watch
    #[serde(default, alias = "proton_drive_url")]
    pub drive_url: String,

    /// Log messages instead of delivering them
    #[serde(default)]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GeneralConfig {
    /// Alert backend name, normalized to lowercase
    pub fn alert_backend(&self) -> String {
        self.alert_service.trim().to_lowercase()
    }

    fn validate(&self) -> Result<()> {
        let url = self.drive_url.trim();
        if url.is_empty() {
            return Err(Error::config("general.drive_url is required"));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(Error::config(format!(
                "general.drive_url must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(Error::config(format!(
                "general.log_level '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ))),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            alert_service: default_alert_service(),
            drive_url: String::new(),
            dry_run: false,
            log_level: default_log_level(),
        }
    }
}

/// `[twilio]` section
#[derive(Clone, Default, Deserialize)]
pub struct TwilioConfig {
    /// Account SID
    #[serde(default)]
    pub account_sid: String,
    /// Auth token
    #[serde(default)]
    pub auth_token: String,
    /// Sending WhatsApp number, without the channel prefix
    #[serde(default)]
    pub whatsapp_number: String,
    /// Recipient WhatsApp number, without the channel prefix
    #[serde(default)]
    pub target_number: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<REDACTED>")
            .field("whatsapp_number", &self.whatsapp_number)
            .field("target_number", &self.target_number)
            .finish()
    }
}

/// `[telegram]` section
#[derive(Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat
    #[serde(default)]
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// `[monitor]` section
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between poll cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl PollConfig {
    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.poll_interval_secs) {
            return Err(Error::config(format!(
                "monitor.poll_interval_secs must be between 1 and 86400 seconds. Got: {}",
                self.poll_interval_secs
            )));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// `[browser]` section
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Scratch profile directory handed to the browser
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// File overwritten with the rendered page on every poll
    #[serde(default = "default_debug_page_path")]
    pub debug_page_path: PathBuf,

    /// Maximum wait for the first item to render, in seconds
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Delay between checks while waiting, in milliseconds
    #[serde(default = "default_wait_poll_ms")]
    pub wait_poll_ms: u64,

    /// Explicit browser binary; auto-detected when unset
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Extra command-line switches for the browser
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl BrowserConfig {
    /// Maximum wait for items as a duration
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Re-check delay as a duration
    pub fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.wait_timeout_secs) {
            return Err(Error::config(format!(
                "browser.wait_timeout_secs must be between 1 and 300 seconds. Got: {}",
                self.wait_timeout_secs
            )));
        }
        if self.wait_poll_ms == 0 {
            return Err(Error::config("browser.wait_poll_ms must be > 0"));
        }
        if self.debug_page_path.as_os_str().is_empty() {
            return Err(Error::config("browser.debug_page_path cannot be empty"));
        }
        Ok(())
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            debug_page_path: default_debug_page_path(),
            wait_timeout_secs: default_wait_timeout_secs(),
            wait_poll_ms: default_wait_poll_ms(),
            chrome_executable: None,
            extra_args: Vec::new(),
        }
    }
}

fn default_alert_service() -> String {
    "twilio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from("/tmp/chrome-user-data")
}

fn default_debug_page_path() -> PathBuf {
    PathBuf::from("debug_page.html")
}

fn default_wait_timeout_secs() -> u64 {
    15
}

fn default_wait_poll_ms() -> u64 {
    500
}
