// # Known Items
//
// The cumulative set of item names ever observed, and the change detector
// that diffs each new snapshot against it.
//
// ## Crash Behavior
//
// - All state is lost on restart/crash
// - The first poll after a restart reports every visible item as new
// - No recovery possible (state is in-memory only)
//
// ## Growth
//
// Entries are never removed. An item that disappears from the page and
// later reappears is not reported again.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::traits::ItemSet;

/// Items observed so far, with the time each was first seen
///
/// # Example
///
/// ```rust
/// use drivewatch_core::state::KnownItems;
/// use drivewatch_core::ItemSet;
///
/// let mut known = KnownItems::new();
/// let snapshot: ItemSet = ["a.txt".to_string()].into_iter().collect();
///
/// assert_eq!(known.detect(&snapshot), snapshot);
/// assert!(known.detect(&snapshot).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnownItems {
    seen: BTreeMap<String, DateTime<Utc>>,
}

impl KnownItems {
    /// Create an empty set of known items
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff a snapshot against the known items
    ///
    /// Returns `snapshot - known`. When that difference is non-empty, every
    /// name in `snapshot` becomes known; otherwise nothing changes.
    pub fn detect(&mut self, snapshot: &ItemSet) -> ItemSet {
        let new_items: ItemSet = snapshot
            .iter()
            .filter(|name| !self.seen.contains_key(*name))
            .cloned()
            .collect();

        if new_items.is_empty() {
            debug!("No new items in snapshot of {}", snapshot.len());
            return new_items;
        }

        let now = Utc::now();
        for name in snapshot {
            self.seen.entry(name.clone()).or_insert(now);
        }
        debug!(
            "{} new item(s), {} known in total",
            new_items.len(),
            self.seen.len()
        );

        new_items
    }

    /// Number of known items
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been observed yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether `name` has been observed
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains_key(name)
    }

    /// When `name` was first observed
    pub fn first_seen(&self, name: &str) -> Option<DateTime<Utc>> {
        self.seen.get(name).copied()
    }

    /// Iterate over the known names
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.seen.keys().map(String::as_str)
    }

    /// Copy of the known names
    pub fn to_set(&self) -> ItemSet {
        self.seen.keys().cloned().collect()
    }
}
