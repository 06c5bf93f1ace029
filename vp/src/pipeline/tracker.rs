//! Stale-resolution guard
//!
//! Every request for a key takes a fresh token. When it resolves, the
//! result is applied only if no newer request for that key has started.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Proof of one started request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken<K> {
    pub key: K,
    pub seq: u64,
}

/// Latest request sequence per key
#[derive(Debug)]
pub struct RequestTracker<K> {
    next: AtomicU64,
    latest: Mutex<HashMap<K, u64>>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
            latest: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `key`, superseding any in flight
    pub fn begin(&self, key: K) -> RequestToken<K> {
        let seq = self.next.fetch_add(1, Ordering::SeqCst);
        debug!(?key, %seq, "RequestTracker::begin: called");
        let mut latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        latest.insert(key, seq);
        RequestToken { key, seq }
    }

    /// True when no newer request for the same key has started
    pub fn is_current(&self, token: &RequestToken<K>) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        latest.get(&token.key) == Some(&token.seq)
    }
}
