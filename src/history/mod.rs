//! Parent-side listening history kept on the device.
//!
//! Two lists live in a local key-value store: `history` (tracks the child played,
//! which the parent can react to) and `excluded` (tracks the parent disliked).
//! Each list is written whole on every change; the last write from the device wins.

use thiserror::Error;

pub mod repository;
pub mod store;

pub use repository::{HistoryEntry, HistoryRepository, HISTORY_KEY, EXCLUDED_KEY, SCHEMA_VERSION};
pub use store::{FileLocalStore, MemoryLocalStore};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Local store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Local store file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Malformed value under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value under '{key}' has schema version {found}; newest supported is {supported}")]
    UnsupportedVersion { key: String, found: u32, supported: u32 },
}

/// String key-value storage on the device. Implementations only need whole-value
/// reads and writes.
pub trait LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
}
