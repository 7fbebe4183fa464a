// # Snapshot Source Trait
//
// Defines the interface for observing which items (files and folders) are
// currently visible on the watched drive page.
//
// ## Implementations
//
// - Headless Chrome: `drivewatch-source-chrome` crate
//
// ## Usage
//
// ```rust,ignore
// use drivewatch_core::ItemSnapshotSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* ItemSnapshotSource implementation */;
//
//     let items = source.snapshot().await?;
//     for name in &items {
//         println!("visible: {}", name);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::FetchError;

/// A set of item display names
///
/// Ordered storage keeps log lines and messages stable; callers must not
/// depend on the order.
pub type ItemSet = BTreeSet<String>;

/// Trait for snapshot source implementations
///
/// A source is an observer: it reports what is visible right now and makes
/// no decisions about what is new.
///
/// # Timeouts
///
/// A page that renders slowly is not an error. Implementations wait for a
/// bounded time and then return whatever was visible, possibly nothing.
/// Errors are reserved for failures that make the page unreadable (the
/// browser did not start, navigation failed).
///
/// # Resources
///
/// Any session opened by `snapshot()` must be released before it returns,
/// on every path.
#[async_trait]
pub trait ItemSnapshotSource: Send + Sync {
    /// Take a fresh snapshot of the visible item names
    ///
    /// # Returns
    ///
    /// - `Ok(ItemSet)`: Names currently visible (may be empty)
    /// - `Err(FetchError)`: The page could not be read at all
    async fn snapshot(&self) -> Result<ItemSet, FetchError>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
