//! Plugin-based sender registry
//!
//! The registry maps backend names to [`MessageSenderFactory`] objects, so the
//! alert backend can be chosen from configuration without a hard-coded
//! if-else chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drivewatch_core::registry::SenderRegistry;
//!
//! let mut registry = SenderRegistry::new();
//! drivewatch_notify_telegram::register(&mut registry);
//! drivewatch_notify_twilio::register(&mut registry);
//!
//! let sender = registry.create_sender("telegram", &config)?;
//! ```
//!
//! Names are matched case-insensitively.

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::traits::{MessageSender, MessageSenderFactory};
use std::collections::HashMap;

/// Sender registry for plugin-based backend creation
#[derive(Default)]
pub struct SenderRegistry {
    /// Registered sender factories, keyed by lowercase name
    senders: HashMap<String, Box<dyn MessageSenderFactory>>,
}

impl SenderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender factory
    ///
    /// Registering the same name twice replaces the earlier factory.
    ///
    /// # Parameters
    ///
    /// - `name`: Backend name (e.g., "telegram", "twilio")
    /// - `factory`: Factory object for creating sender instances
    pub fn register_sender(&mut self, name: impl AsRef<str>, factory: Box<dyn MessageSenderFactory>) {
        self.senders.insert(normalize(name.as_ref()), factory);
    }

    /// Create a sender by backend name
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn MessageSender>)`: Created sender instance
    /// - `Err(Error)`: If the name is not registered or creation fails
    pub fn create_sender(&self, name: &str, config: &MonitorConfig) -> Result<Box<dyn MessageSender>> {
        let key = normalize(name);
        let factory = self
            .senders
            .get(&key)
            .ok_or_else(|| Error::config(format!("Unknown alert service: {}", name)))?;

        factory.create(config)
    }

    /// Check if a backend name is registered
    pub fn has_sender(&self, name: &str) -> bool {
        self.senders.contains_key(&normalize(name))
    }

    /// List all registered backend names, sorted
    pub fn list_senders(&self) -> Vec<String> {
        let mut names: Vec<String> = self.senders.keys().cloned().collect();
        names.sort();
        names
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
