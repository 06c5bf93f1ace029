//! History repository: the persisted ordered list of entries

use tracing::{debug, warn};

use super::{HistoryEntry, HistoryError, KeyValueStore};

/// Key the history list is stored under
pub const HISTORY_KEY: &str = "vidprompt.history";

/// Load/save capability injected into [`super::History`]
pub trait HistoryRepository: Send + Sync {
    /// Stored entries, newest first; absent or corrupt data yields an empty list
    fn load(&self) -> Vec<HistoryEntry>;

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError>;
}

/// Repository keeping the whole list as one JSON value in a key-value store
#[derive(Debug, Clone)]
pub struct StoreHistoryRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> StoreHistoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, HISTORY_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> HistoryRepository for StoreHistoryRepository<S> {
    fn load(&self) -> Vec<HistoryEntry> {
        debug!(key = %self.key, "StoreHistoryRepository::load: called");
        let text = match self.store.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("StoreHistoryRepository::load: nothing stored");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "History store unreadable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Stored history is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        debug!(key = %self.key, count = entries.len(), "StoreHistoryRepository::save: called");
        let text = serde_json::to_string(entries)?;
        self.store.set(&self.key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Brief, Language, fixtures::sample_result};
    use crate::history::{FileStore, MemoryStore};

    #[test]
    fn test_absent_data_loads_empty() {
        let repo = StoreHistoryRepository::new(MemoryStore::new());
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        for blob in ["not json", "{\"id\": 1}", "[{\"id\": \"x\"}]", ""] {
            let repo = StoreHistoryRepository::new(MemoryStore::with_value(HISTORY_KEY, blob));
            assert!(repo.load().is_empty(), "blob {:?} should load empty", blob);
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StoreHistoryRepository::new(FileStore::new(dir.path()));
        let entries = vec![
            HistoryEntry::new(Brief::default(), sample_result("Newer", 8), Language::En),
            HistoryEntry::new(Brief::default(), sample_result("Older", 12), Language::Ko),
        ];
        repo.save(&entries).unwrap();

        let reopened = StoreHistoryRepository::new(FileStore::new(dir.path()));
        assert_eq!(reopened.load(), entries);
        assert!(dir.path().join("vidprompt.history.json").exists());
    }
}
