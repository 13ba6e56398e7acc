//! UA Switcher CLI support
//!
//! A JSON-file backed store and the subcommands built on it.

pub mod commands;
pub mod file_store;

pub use file_store::JsonFileStore;
