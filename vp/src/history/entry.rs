//! HistoryEntry - one remembered generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Brief, GeneratedResult, Language};

/// A brief together with the result it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// UUIDv7, time-ordered and unique
    pub id: String,
    /// Creation time in Unix milliseconds
    pub timestamp: i64,
    pub brief: Brief,
    pub result: GeneratedResult,
    /// Language the result was generated in
    #[serde(default)]
    pub language: Language,
}

impl HistoryEntry {
    pub fn new(brief: Brief, result: GeneratedResult, language: Language) -> Self {
        debug!(title = %result.title, %language, "HistoryEntry::new: called");
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            brief,
            result,
            language,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Short form of the id for listings
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(8)
            .map_or(self.id.as_str(), |(end, _)| &self.id[..end])
    }
}
