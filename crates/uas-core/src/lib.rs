//! UA Switcher Core Library
//!
//! This crate holds the logic behind the UA Switcher browser extension: which
//! User-Agent override applies to a request, the change-tracked list of
//! offered overrides, and what the toolbar icon shows.
//!
//! # Architecture
//!
//! Everything here is synchronous and pure except for loading and storing,
//! which go through the async [`KeyValueStore`] trait. The extension (or the
//! CLI) supplies the store; the core never owns global state.
//!
//! # Modules
//!
//! - `hash`: Murmur3 checksum for change detection
//! - `url`: Host extraction without allocations
//! - `resolver`: Longest-suffix override lookup
//! - `store`: Key-value store trait and in-memory store
//! - `tracked`: Change-tracked persisted lists with reset/undo
//! - `options`: Options state, startup bootstrap and change reducer
//! - `presenter`: Toolbar badge, title and icon
//! - `types`: Shared type definitions

pub mod error;
pub mod hash;
pub mod options;
pub mod presenter;
pub mod resolver;
pub mod store;
pub mod tracked;
pub mod types;
pub mod url;

/// The list shipped with the extension, in `user-agents.txt` format.
pub const DEFAULT_USER_AGENTS: &str = include_str!("../assets/user-agents.txt");

// Re-export commonly used types
pub use error::{ResolveError, StorageError, TrackedError};
pub use hash::checksum;
pub use options::{keys, Options};
pub use presenter::{badge_text, processing_enabled, IconConfig, IconPresenter, IconState};
pub use resolver::{resolve, resolve_or_none};
pub use store::{KeyValueStore, MemoryStore, StorageChange, StorageChanges, StoreRecord};
pub use tracked::{ChangeTracked, ResetUndo};
pub use types::{EditMode, OptionFields, OverrideTable};
pub use uas_format::{parse_entries, serialize_entries, Entry, EntryList};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list_parses_cleanly() {
        let entries = parse_entries(DEFAULT_USER_AGENTS);
        let stats = uas_format::ListStats::from_entries(&entries);
        assert!(stats.overrides >= 10);
        assert_eq!(stats.invalid(), 0);
        assert_eq!(parse_entries(&serialize_entries(&entries)), entries);
    }

    #[test]
    fn test_default_list_badges() {
        let entries = parse_entries(DEFAULT_USER_AGENTS);
        for (label, value) in uas_format::overrides(&entries) {
            let badge = badge_text(&entries, Some(value));
            assert!(!badge.is_empty(), "no badge for {label}");
        }
    }
}
