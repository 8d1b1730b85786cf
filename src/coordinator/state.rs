//! Binding state and options

use std::time::Duration;

use crate::error::FetchError;

// == Query State ==
/// What a consuming view renders for one binding.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    /// Last successfully resolved value
    pub data: Option<V>,
    /// True exactly while an attempt is in flight
    pub is_loading: bool,
    /// Most recent failure, cleared when a new attempt starts
    pub error: Option<FetchError>,
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<V> QueryState<V> {
    /// Settled with neither a value nor an error.
    pub fn is_idle(&self) -> bool {
        !self.is_loading && self.data.is_none() && self.error.is_none()
    }
}

// == Bind Options ==
/// Per-binding settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Overrides the store's default TTL
    pub ttl: Option<Duration>,
    /// When false the binding never fetches and keeps its state as is
    pub enabled: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            enabled: true,
        }
    }
}

impl BindOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
