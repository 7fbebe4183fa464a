//! Core monitor engine
//!
//! The MonitorEngine is responsible for:
//! - Announcing startup and shutdown
//! - Taking a snapshot of the drive page on every poll
//! - Diffing it against the known items
//! - Alerting when new items appear
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ ItemSnapshotSource │─── ItemSet ───┐
//! └────────────────────┘               │
//!                                      ▼
//!                             ┌────────────────┐
//!                             │ MonitorEngine  │
//!                             └────────────────┘
//!                                      │
//!          ┌───────────────────────────┼───────────────────────────┐
//!          │                           │                           │
//!          ▼                           ▼                           ▼
//! ┌─────────────────┐         ┌──────────────┐           ┌─────────────┐
//! │   KnownItems    │         │   Notifier   │           │   Events    │
//! │   (detect)      │         │   (alert)    │           │  (observe)  │
//! └─────────────────┘         └──────────────┘           └─────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Starting ──► Polling ──(shutdown signal)──► Stopped
//!                 │
//!                 └──(snapshot error)──► Faulted
//! ```
//!
//! The shutdown signal is only observed between poll cycles. A cycle that
//! has started always runs to completion.

use std::future::Future;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::notifier::{DeliveryOutcome, Notifier};
use crate::state::KnownItems;
use crate::traits::{ItemSet, ItemSnapshotSource};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Status message sent once polling is about to start
pub fn startup_message(target_url: &str) -> String {
    format!("Monitoring started for {}", target_url)
}

/// Status message sent after a clean shutdown
pub const SHUTDOWN_MESSAGE: &str = "Monitoring script has been stopped.";

/// Default capacity of the event channel
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Constructed, startup message not yet sent
    Starting,
    /// Running poll cycles
    Polling,
    /// Shut down after a signal
    Stopped,
    /// Stopped by an error in a poll cycle
    Faulted,
}

/// Events emitted by the MonitorEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Engine started polling
    Started {
        target_url: String,
    },

    /// A snapshot was taken
    SnapshotTaken {
        item_count: usize,
    },

    /// New items were detected
    NewItemsDetected {
        items: ItemSet,
    },

    /// An alert was handed to the notifier
    AlertDispatched {
        outcome: DeliveryOutcome,
    },

    /// Engine stopped after a shutdown signal
    Stopped,

    /// Engine stopped after an error
    Faulted {
        error: String,
    },
}

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Page being watched, used in the startup message
    pub target_url: String,

    /// Sleep between poll cycles
    pub poll_interval: Duration,

    /// Capacity of the event channel
    pub event_channel_capacity: usize,
}

impl EngineSettings {
    /// Settings with the default channel capacity
    pub fn new(target_url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            poll_interval,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl From<&MonitorConfig> for EngineSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self::new(config.general.drive_url.trim(), config.monitor.poll_interval())
    }
}

/// Core monitor engine
///
/// The engine owns the [`KnownItems`] for the lifetime of the process and
/// lends them to the change detector on every cycle.
///
/// ## Threading
///
/// All work in a cycle is awaited in sequence; the engine never spawns
/// tasks of its own.
pub struct MonitorEngine {
    /// Snapshot source for the watched page
    source: Box<dyn ItemSnapshotSource>,

    /// Alert and status dispatch
    notifier: Notifier,

    /// Items observed so far
    known: KnownItems,

    /// Page being watched
    target_url: String,

    /// Sleep between poll cycles
    poll_interval: Duration,

    /// Current lifecycle state
    state: MonitorState,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl MonitorEngine {
    /// Create a new monitor engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn ItemSnapshotSource>,
        notifier: Notifier,
        settings: EngineSettings,
    ) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(settings.event_channel_capacity.max(1));

        let engine = Self {
            source,
            notifier,
            known: KnownItems::new(),
            target_url: settings.target_url,
            poll_interval: settings.poll_interval,
            state: MonitorState::Starting,
            event_tx: tx,
        };

        (engine, rx)
    }

    /// Current lifecycle state
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Items observed so far
    pub fn known_items(&self) -> &KnownItems {
        &self.known
    }

    /// Run until `shutdown` resolves
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown; the shutdown message was sent
    /// - `Err(Error)`: A poll cycle failed; no shutdown message is sent
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!("Starting monitor for {}", self.target_url);
        self.notifier
            .notify_status(&startup_message(&self.target_url))
            .await;
        self.state = MonitorState::Polling;
        self.emit_event(MonitorEvent::Started {
            target_url: self.target_url.clone(),
        });

        loop {
            if let Err(e) = self.poll_once().await {
                error!("An error occurred: {}", e);
                self.state = MonitorState::Faulted;
                self.emit_event(MonitorEvent::Faulted {
                    error: e.to_string(),
                });
                return Err(e);
            }

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("{}", SHUTDOWN_MESSAGE);
        self.notifier.notify_status(SHUTDOWN_MESSAGE).await;
        self.state = MonitorState::Stopped;
        self.emit_event(MonitorEvent::Stopped);

        Ok(())
    }

    /// Run one poll cycle: snapshot, detect, alert
    ///
    /// # Returns
    ///
    /// The items that were new in this cycle (possibly empty).
    pub async fn poll_once(&mut self) -> Result<ItemSet> {
        let snapshot = self.source.snapshot().await?;
        info!("Retrieved items: {:?}", snapshot);
        self.emit_event(MonitorEvent::SnapshotTaken {
            item_count: snapshot.len(),
        });

        let new_items = self.known.detect(&snapshot);
        if new_items.is_empty() {
            debug!("No new items");
            return Ok(new_items);
        }

        info!("New items detected: {:?}", new_items);
        self.emit_event(MonitorEvent::NewItemsDetected {
            items: new_items.clone(),
        });

        let outcome = self.notifier.notify_new_items(&new_items).await;
        self.emit_event(MonitorEvent::AlertDispatched { outcome });

        Ok(new_items)
    }

    /// Emit an engine event
    fn emit_event(&self, event: MonitorEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}
