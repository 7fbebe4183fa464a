//! Error types for the drivewatch system
//!
//! This module defines all error types used throughout the crate.
//!
//! - [`FetchError`]: returned by [`ItemSnapshotSource`](crate::traits::ItemSnapshotSource)
//! - [`SendError`]: returned by [`MessageSender`](crate::traits::MessageSender)
//! - [`Error`]: crate-wide error for configuration and the engine
//!
//! Delivery failures never become an [`Error`]; the notifier reports them as
//! outcomes.

use thiserror::Error;

/// Result type alias for drivewatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while taking an item snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The browser could not be started
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// The target page could not be opened
    #[error("failed to open {url}: {message}")]
    Navigation {
        /// Page that was being opened
        url: String,
        /// Underlying failure
        message: String,
    },

    /// The page was opened but reading it failed
    #[error("failed to read page: {0}")]
    Extraction(String),
}

impl FetchError {
    /// Create a launch error
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }
}

/// Errors produced while delivering a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Required credentials are missing or empty
    #[error("{backend} configuration is incomplete (missing: {})", missing.join(", "))]
    IncompleteConfig {
        /// Backend name
        backend: &'static str,
        /// Names of the missing keys
        missing: Vec<&'static str>,
    },

    /// The provider answered with a failure status
    #[error("{backend} rejected the message with status {status}: {body}")]
    Rejected {
        /// Backend name
        backend: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, as returned by the provider
        body: String,
    },

    /// The request never produced a response
    #[error("{backend} request failed: {message}")]
    Transport {
        /// Backend name
        backend: &'static str,
        /// Underlying failure
        message: String,
    },

    /// The provider answered with something we could not understand
    #[error("{backend} returned an invalid response: {message}")]
    InvalidResponse {
        /// Backend name
        backend: &'static str,
        /// What was wrong with it
        message: String,
    },
}

impl SendError {
    /// Create a transport error
    pub fn transport(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            backend,
            message: message.into(),
        }
    }

    /// Create an invalid-response error
    pub fn invalid_response(backend: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend,
            message: message.into(),
        }
    }

    /// Whether the failure is a configuration problem rather than a delivery problem
    pub fn is_config(&self) -> bool {
        matches!(self, Self::IncompleteConfig { .. })
    }
}

/// Core error type for the drivewatch system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot source errors
    #[error("Snapshot error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration file parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
