//! Error types for UA Switcher core.

/// Error from resolving an override for a URL.
///
/// Callers treat this as "no override applies".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("No hostname in URL: {url}")]
    InvalidUrl { url: String },
}

/// Error from the external key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Failed to decode stored value for '{key}': {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error from a change-tracked list operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackedError {
    #[error("Index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
