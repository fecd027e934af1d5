//! Process-local caches for the classification and SQL-generation stages.
//!
//! The cache is injected at construction so a bounded or shared
//! implementation can be swapped in without touching the call sites.
//! Entries live until an explicit clear or process restart; there is no
//! expiry and no size bound. Concurrent writes to the same key are
//! idempotent overwrites and therefore harmless.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Key/value store used by the classifier and generator.
pub trait QueryCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded in-memory cache with hit/miss accounting.
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, V>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.entries.read().unwrap().len(),
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f32 / total as f32
            } else {
                0.0
            },
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> QueryCache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let hit = self.entries.read().unwrap().get(key).cloned();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    fn set(&self, key: &str, value: V) {
        self.entries.write().unwrap().insert(key.to_string(), value);
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f32,
}
