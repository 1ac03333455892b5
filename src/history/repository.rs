use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoryError, LocalStore};

pub const HISTORY_KEY: &str = "patou.history";
pub const EXCLUDED_KEY: &str = "patou.excluded";

/// Layout written today. Version 0 is the bare JSON array layout, which is
/// still readable and gets upgraded on the next write.
pub const SCHEMA_VERSION: u32 = 1;

const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Spotify track id
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            image_url: None,
            added_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredList {
    version: u32,
    tracks: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Versioned(StoredList),
    Legacy(Vec<HistoryEntry>),
}

/// The history and excluded lists on top of any `LocalStore`
pub struct HistoryRepository<S: LocalStore> {
    store: S,
    capacity: usize,
}

impl<S: LocalStore> HistoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Oldest history entries are dropped past `capacity`
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.load(HISTORY_KEY)
    }

    pub fn excluded(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.load(EXCLUDED_KEY)
    }

    /// Put a played track at the front of the history. Returns `false` (and
    /// changes nothing) when the parent already excluded it.
    pub fn record(&self, entry: HistoryEntry) -> Result<bool, HistoryError> {
        if self.excluded()?.iter().any(|t| t.id == entry.id) {
            return Ok(false);
        }

        let mut history = self.history()?;
        history.retain(|t| t.id != entry.id);
        history.insert(0, entry);
        history.truncate(self.capacity);
        self.save(HISTORY_KEY, history)?;
        Ok(true)
    }

    /// Move a track from history to excluded. Returns whether it was found.
    pub fn exclude(&self, track_id: &str) -> Result<bool, HistoryError> {
        self.move_between(HISTORY_KEY, EXCLUDED_KEY, track_id)
    }

    /// Move a track from excluded back to history. Returns whether it was found.
    pub fn restore(&self, track_id: &str) -> Result<bool, HistoryError> {
        self.move_between(EXCLUDED_KEY, HISTORY_KEY, track_id)
    }

    pub fn clear_history(&self) -> Result<(), HistoryError> {
        self.save(HISTORY_KEY, Vec::new())
    }

    fn move_between(&self, from_key: &str, to_key: &str, track_id: &str) -> Result<bool, HistoryError> {
        let mut from = self.load(from_key)?;
        let Some(pos) = from.iter().position(|t| t.id == track_id) else {
            return Ok(false);
        };
        let entry = from.remove(pos);

        let mut to = self.load(to_key)?;
        to.retain(|t| t.id != track_id);
        to.insert(0, entry);

        // Destination first: an interrupted move leaves a duplicate, never a loss
        self.save(to_key, to)?;
        self.save(from_key, from)?;
        Ok(true)
    }

    fn load(&self, key: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        let value: StoredValue = serde_json::from_str(&raw).map_err(|source| HistoryError::Malformed {
            key: key.to_string(),
            source,
        })?;

        match value {
            StoredValue::Versioned(list) if list.version > SCHEMA_VERSION => Err(HistoryError::UnsupportedVersion {
                key: key.to_string(),
                found: list.version,
                supported: SCHEMA_VERSION,
            }),
            StoredValue::Versioned(list) => Ok(list.tracks),
            StoredValue::Legacy(tracks) => {
                tracing::debug!("Reading unversioned list under '{}'", key);
                Ok(tracks)
            }
        }
    }

    fn save(&self, key: &str, tracks: Vec<HistoryEntry>) -> Result<(), HistoryError> {
        let list = StoredList {
            version: SCHEMA_VERSION,
            tracks,
        };
        let raw = serde_json::to_string(&list).map_err(|source| HistoryError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw)
    }
}
