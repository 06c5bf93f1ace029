//! Translation cache
//!
//! Translated results are kept per language for the generation they were
//! made from. A new generation resets the cache, and a translation that
//! resolves for an older generation is discarded.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{GeneratedResult, Language};

#[derive(Debug, Default)]
pub struct TranslationCache {
    generation: Option<u64>,
    entries: HashMap<Language, GeneratedResult>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything and bind the cache to a new generation
    pub fn reset(&mut self, generation: u64) {
        debug!(%generation, "TranslationCache::reset: called");
        self.generation = Some(generation);
        self.entries.clear();
    }

    /// Forget everything; nothing is cached until the next `reset`
    pub fn invalidate(&mut self) {
        debug!("TranslationCache::invalidate: called");
        self.generation = None;
        self.entries.clear();
    }

    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn get(&self, generation: u64, language: Language) -> Option<&GeneratedResult> {
        if self.generation != Some(generation) {
            return None;
        }
        self.entries.get(&language)
    }

    /// Store a translation; returns false when it belongs to a stale generation
    pub fn insert(&mut self, generation: u64, language: Language, result: GeneratedResult) -> bool {
        if self.generation != Some(generation) {
            debug!(%generation, current = ?self.generation, "TranslationCache::insert: stale generation");
            return false;
        }
        self.entries.insert(language, result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::sample_result;

    #[test]
    fn test_hit_within_generation() {
        let mut cache = TranslationCache::new();
        cache.reset(1);
        assert!(cache.insert(1, Language::En, sample_result("Skate Cat", 8)));
        assert_eq!(cache.get(1, Language::En).unwrap().title, "Skate Cat");
        assert!(cache.get(1, Language::Ko).is_none());
    }

    #[test]
    fn test_new_generation_clears() {
        let mut cache = TranslationCache::new();
        cache.reset(1);
        cache.insert(1, Language::En, sample_result("old", 8));
        cache.reset(2);
        assert!(cache.get(1, Language::En).is_none());
        assert!(cache.get(2, Language::En).is_none());
    }

    #[test]
    fn test_stale_insert_rejected() {
        let mut cache = TranslationCache::new();
        cache.reset(2);
        assert!(!cache.insert(1, Language::En, sample_result("late", 8)));
        assert!(cache.get(2, Language::En).is_none());

        cache.invalidate();
        assert!(!cache.insert(2, Language::En, sample_result("late", 8)));
        assert_eq!(cache.generation(), None);
    }
}
