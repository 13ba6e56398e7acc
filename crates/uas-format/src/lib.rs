//! UA Switcher List Format
//!
//! This crate parses and writes the human-editable `user-agents.txt` format
//! and defines the [`Entry`] model the rest of the extension stores.

pub mod entry;
pub mod parser;

pub use entry::{label_for_value, overrides, Entry, EntryList};
pub use parser::{parse_entries, parse_entries_into, parse_line, serialize_entries, ListStats};
