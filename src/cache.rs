use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::models::ExtractionResult;

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub result: Arc<ExtractionResult>,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Extraction results keyed by the requested URL, expired lazily on lookup.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<ExtractionResult>> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<ExtractionResult>> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) if entry.get().is_expired(now, self.ttl) => {
                entry.remove();
                None
            }
            Entry::Occupied(entry) => Some(Arc::clone(&entry.get().result)),
            Entry::Vacant(_) => None,
        }
    }

    pub fn set(&self, key: &str, result: Arc<ExtractionResult>) {
        self.set_at(key, result, Instant::now());
    }

    pub fn set_at(&self, key: &str, result: Arc<ExtractionResult>, now: Instant) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                result,
                created_at: now,
            },
        );
    }

    // Physically present entries, including ones not yet found stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
