//! Cache Store Module
//!
//! TTL-based key-value memoization. Expiry is evaluated lazily on read;
//! nothing sweeps the store in the background.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

// == Cache Store ==
/// In-memory TTL store shared by every coordinator binding.
///
/// All operations are synchronous and serialized by an internal mutex, so a
/// store is shared as `Arc<CacheStore<V>>` without further locking.
#[derive(Debug)]
pub struct CacheStore<V> {
    inner: Mutex<Inner<V>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store reading the system clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates a store with an explicit time source.
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and resetting its TTL.
    ///
    /// `None` uses the store default. A zero TTL is accepted but the entry
    /// is never served: the next read evicts it.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl, self.clock.now_ms());

        let mut inner = self.inner.lock();
        inner.entries.insert(key, entry);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
    }

    // == Get ==
    /// Returns a clone of the value if present and fresh.
    ///
    /// Expired entries are removed before the miss is returned. A miss never
    /// creates an entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.entries.get(key) {
            None => {
                inner.stats.record_miss();
                debug!(key, "cache miss");
                None
            }
            Some(entry) if !entry.is_expired(now) => {
                inner.stats.record_hit();
                debug!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                inner.entries.remove(key);
                inner.stats.set_total_entries(inner.entries.len());
                inner.stats.record_expiration();
                debug!(key, "evicted expired entry");
                None
            }
        }
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Returns whether anything was removed.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(key).is_some();
        if removed {
            inner.stats.record_invalidations(1);
            let len = inner.entries.len();
            inner.stats.set_total_entries(len);
            debug!(key, "invalidated entry");
        }
        removed
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key contains `pattern` as a literal
    /// substring. Returns the number of entries removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.contains(pattern));
        let removed = before - inner.entries.len();

        inner.stats.record_invalidations(removed);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
        debug!(pattern, removed, "invalidated entries by pattern");
        removed
    }

    // == Clear ==
    /// Removes all entries. Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.stats.record_invalidations(removed);
        inner.stats.set_total_entries(0);
        removed
    }

    // == Introspection ==
    /// Raw presence check. Does not evaluate expiry or touch statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Keys currently held, fresh or not, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }
}
