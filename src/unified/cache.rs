//! In-memory response cache with TTL expiry and bounded capacity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
}

/// Keyed cache for merged upstream results.
///
/// Entries are valid for `ttl` after insertion and are overwritten by
/// re-fetches. Capacity is bounded: inserting past `max_entries` first sweeps
/// expired entries, then evicts the oldest remaining one.
pub struct ResponseCache<T> {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ResponseCache<T> {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        let entry = entries.get(key)?;

        if entry.stored_at.elapsed() < self.ttl {
            debug!(key, "cache hit");
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: impl Into<String>, data: T) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        if entries.len() >= self.max_entries {
            entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        }
        if entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(key) = oldest {
                entries.remove(&key);
            }
        }

        entries.insert(
            key.into(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_returned() {
        let cache = ResponseCache::new(Duration::from_secs(60), 8);
        cache.insert("kirito", 42);
        assert_eq!(cache.get("kirito"), Some(42));
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let cache = ResponseCache::new(Duration::ZERO, 8);
        cache.insert("kirito", 42);
        assert_eq!(cache.get("kirito"), None);
    }

    #[test]
    fn newer_entry_supersedes_older() {
        let cache = ResponseCache::new(Duration::from_secs(60), 8);
        cache.insert("query", 1);
        cache.insert("query", 2);
        assert_eq!(cache.get("query"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60), 3);
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            cache.insert(*key, i);
        }
        assert!(cache.len() <= 3);
        // The newest entry always survives eviction.
        assert_eq!(cache.get("e"), Some(4));
    }

    #[test]
    fn missing_key_is_none() {
        let cache: ResponseCache<u32> = ResponseCache::new(Duration::from_secs(60), 8);
        assert_eq!(cache.get("nothing"), None);
        assert!(cache.is_empty());
    }
}
