//! Alert dispatch
//!
//! The [`Notifier`] formats new-item alerts and hands them to the configured
//! backend. It never fails: every problem (missing credentials, provider
//! rejection, network error, unknown backend) is logged and reported as a
//! [`DeliveryOutcome`].
//!
//! ## Status messages
//!
//! Startup and shutdown messages always go through the *status* sender,
//! which [`Notifier::from_registry`] wires to the Telegram backend no matter
//! which backend `general.alert_service` selects. New-item alerts honor the
//! configured backend. The two paths are deliberately kept separate; unifying
//! them changes who receives the status messages.

use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::registry::SenderRegistry;
use crate::traits::{ItemSet, MessageSender};

/// Header line of every new-item alert
pub const NEW_ITEMS_HEADER: &str = "New items detected:";

/// Backend that carries startup and shutdown messages
pub const STATUS_BACKEND: &str = "telegram";

/// Where new-item alerts go
pub enum AlertRoute {
    /// A registered backend
    Sender(Box<dyn MessageSender>),
    /// `alert_service` named a backend that does not exist
    Unknown(String),
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The backend accepted the message
    Delivered {
        /// Backend that carried it
        backend: &'static str,
        /// Provider message id, if any
        message_id: Option<String>,
    },
    /// The backend refused or could not be reached
    Failed {
        /// Backend that was tried
        backend: &'static str,
        /// Rendered error
        error: String,
    },
    /// No backend matches the configured name
    UnknownBackend(String),
    /// There was nothing to report
    NothingToSend,
}

impl DeliveryOutcome {
    /// Whether the message reached a provider
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Build the alert text for a set of new items
pub fn format_new_items(items: &ItemSet) -> String {
    let mut message = String::from(NEW_ITEMS_HEADER);
    for item in items {
        message.push('\n');
        message.push_str(item);
    }
    message
}

/// Dispatches alerts and status messages
pub struct Notifier {
    alerts: AlertRoute,
    status: Box<dyn MessageSender>,
}

impl Notifier {
    /// Create a notifier from explicit routes
    pub fn new(alerts: AlertRoute, status: Box<dyn MessageSender>) -> Self {
        Self { alerts, status }
    }

    /// Resolve both routes from configuration
    ///
    /// An unknown `alert_service` is not an error here; it becomes
    /// [`AlertRoute::Unknown`] and is reported on every alert. The status
    /// backend, however, must be registered.
    pub fn from_registry(registry: &SenderRegistry, config: &MonitorConfig) -> Result<Self> {
        let backend = config.general.alert_backend();
        let alerts = if registry.has_sender(&backend) {
            AlertRoute::Sender(registry.create_sender(&backend, config)?)
        } else {
            AlertRoute::Unknown(backend)
        };
        let status = registry.create_sender(STATUS_BACKEND, config)?;

        Ok(Self::new(alerts, status))
    }

    /// Name of the configured alert backend
    pub fn alert_backend(&self) -> &str {
        match &self.alerts {
            AlertRoute::Sender(sender) => sender.sender_name(),
            AlertRoute::Unknown(name) => name,
        }
    }

    /// Send a new-item alert through the configured backend
    pub async fn notify_new_items(&self, items: &ItemSet) -> DeliveryOutcome {
        if items.is_empty() {
            return DeliveryOutcome::NothingToSend;
        }

        match &self.alerts {
            AlertRoute::Sender(sender) => {
                deliver(sender.as_ref(), &format_new_items(items)).await
            }
            AlertRoute::Unknown(name) => {
                error!("Unknown alert service specified: {}", name);
                DeliveryOutcome::UnknownBackend(name.clone())
            }
        }
    }

    /// Send a status message through the status backend
    pub async fn notify_status(&self, text: &str) -> DeliveryOutcome {
        deliver(self.status.as_ref(), text).await
    }
}

async fn deliver(sender: &dyn MessageSender, text: &str) -> DeliveryOutcome {
    let backend = sender.sender_name();
    match sender.send(text).await {
        Ok(receipt) => {
            match &receipt.message_id {
                Some(id) => info!("Message sent via {}: {}", backend, id),
                None => info!("Message sent via {}", backend),
            }
            DeliveryOutcome::Delivered {
                backend,
                message_id: receipt.message_id,
            }
        }
        Err(e) => {
            error!("Failed to send message via {}: {}", backend, e);
            DeliveryOutcome::Failed {
                backend,
                error: e.to_string(),
            }
        }
    }
}
