//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// Represents a single cache entry with value and write metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp (Unix milliseconds)
    pub written_at: u64,
    /// Lifetime in milliseconds; zero means the entry is never fresh
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Lifetime of the entry
    /// * `now_ms` - Current clock reading
    ///
    /// TTLs beyond `u64::MAX` milliseconds saturate.
    pub fn new(value: V, ttl: Duration, now_ms: u64) -> Self {
        Self {
            value,
            written_at: now_ms,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is still fresh when exactly `ttl` has
    /// elapsed and expires one millisecond later. A zero TTL is always
    /// expired. A clock that went backwards reads as zero elapsed time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.ttl_ms == 0 || now_ms.saturating_sub(self.written_at) > self.ttl_ms
    }
}
