//! Core traits for the drivewatch system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ItemSnapshotSource`]: Observe the items currently visible on the drive page
//! - [`MessageSender`]: Deliver a text message through one messaging backend

pub mod snapshot_source;
pub mod message_sender;

pub use snapshot_source::{ItemSet, ItemSnapshotSource};
pub use message_sender::{MessageSender, MessageSenderFactory, SendReceipt};
