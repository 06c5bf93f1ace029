//! Generation history
//!
//! A bounded, newest-first list of past generations. The list is loaded
//! once through a [`HistoryRepository`] and written back on every change.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Brief, GeneratedResult, Language};

mod entry;
mod repository;
mod store;

pub use entry::HistoryEntry;
pub use repository::{HISTORY_KEY, HistoryRepository, StoreHistoryRepository};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Entries kept before the oldest is dropped
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// History persistence errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("History entry not found: {0}")]
    NotFound(String),

    #[error("History store lock poisoned")]
    Poisoned,
}

/// Newest-first list of past generations
///
/// The in-memory list is authoritative for the session: when a save fails
/// the change is kept and the error is returned.
pub struct History<R> {
    repo: R,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl<R: HistoryRepository> History<R> {
    /// Load the stored list; corrupt or absent data starts empty
    pub fn load(repo: R) -> Self {
        Self::load_with_limit(repo, MAX_HISTORY_ENTRIES)
    }

    pub fn load_with_limit(repo: R, max_entries: usize) -> Self {
        debug!(%max_entries, "History::load_with_limit: called");
        let max_entries = max_entries.max(1);
        let mut entries = repo.load();
        entries.truncate(max_entries);
        info!(count = entries.len(), "History loaded");
        Self {
            repo,
            entries,
            max_entries,
        }
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Find an entry by full id or unique id prefix
    pub fn find(&self, id_or_prefix: &str) -> Result<&HistoryEntry, HistoryError> {
        if let Some(entry) = self.get(id_or_prefix) {
            return Ok(entry);
        }
        let mut matches = self.entries.iter().filter(|e| e.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(entry), None) if !id_or_prefix.is_empty() => Ok(entry),
            _ => Err(HistoryError::NotFound(id_or_prefix.to_string())),
        }
    }

    /// Push a new entry at the head, dropping the oldest beyond the limit
    pub fn record(
        &mut self,
        brief: Brief,
        result: GeneratedResult,
        language: Language,
    ) -> Result<HistoryEntry, HistoryError> {
        let entry = HistoryEntry::new(brief, result, language);
        debug!(id = %entry.id, title = %entry.result.title, "History::record: called");
        self.entries.insert(0, entry.clone());
        if self.entries.len() > self.max_entries {
            let dropped = self.entries.len() - self.max_entries;
            debug!(%dropped, "History::record: dropping oldest entries");
            self.entries.truncate(self.max_entries);
        }
        self.persist()?;
        Ok(entry)
    }

    /// Remove one entry; returns false when the id is unknown
    pub fn remove(&mut self, id: &str) -> Result<bool, HistoryError> {
        debug!(%id, "History::remove: called");
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            debug!(%id, "History::remove: not found");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        debug!(count = self.entries.len(), "History::clear: called");
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), HistoryError> {
        self.repo.save(&self.entries).inspect_err(|e| {
            warn!(error = %e, "Failed to save history");
        })
    }
}
