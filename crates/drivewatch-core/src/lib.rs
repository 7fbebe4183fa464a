// # drivewatch-core
//
// Core library for the drivewatch shared-drive monitor.
//
// ## Architecture Overview
//
// This library provides the core functionality for watching a shared drive
// page and alerting on new items:
// - **ItemSnapshotSource**: Trait for observing the items visible on the page
// - **MessageSender**: Trait for delivering a message through one backend
// - **KnownItems**: In-memory change detector owned by the engine
// - **Notifier**: Alert and status dispatch over the configured backends
// - **MonitorEngine**: Poll loop that ties the pieces together
// - **SenderRegistry**: Plugin-based registry for messaging backends
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from browser and provider code
// 2. **Plugin-Based**: Backends are registered by name, no hard-coded if-else
// 3. **Contained Failures**: Delivery problems are logged, never propagated
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod notifier;
pub mod registry;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{ItemSet, ItemSnapshotSource, MessageSender, MessageSenderFactory, SendReceipt};
pub use engine::{EngineSettings, MonitorEngine, MonitorEvent, MonitorState};
pub use notifier::{AlertRoute, DeliveryOutcome, Notifier};
pub use registry::SenderRegistry;
pub use config::MonitorConfig;
pub use error::{Error, FetchError, Result, SendError};
pub use state::KnownItems;
