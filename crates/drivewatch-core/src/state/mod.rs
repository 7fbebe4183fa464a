// # Monitor State
//
// In-memory state owned by the engine for the lifetime of the process.
// Nothing here is persisted; a restart starts from an empty state.

pub mod known_items;

pub use known_items::KnownItems;
