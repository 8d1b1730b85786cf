//! Query client
//!
//! Composition root for bindings: one store plus the in-flight registry that
//! de-duplicates fetches against it.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::coordinator::{BindOptions, Binding, Fetcher, FlightStats, InFlight, SharedFetcher};

// == Query Client ==
/// Cheap to clone; clones share the same store and registry.
pub struct QueryClient<V> {
    store: Arc<CacheStore<V>>,
    flights: Arc<InFlight<V>>,
}

impl<V> Clone for QueryClient<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            flights: Arc::clone(&self.flights),
        }
    }
}

impl<V> QueryClient<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<CacheStore<V>>) -> Self {
        let flights = Arc::new(InFlight::new(Arc::clone(&store)));
        Self { store, flights }
    }

    pub fn store(&self) -> &Arc<CacheStore<V>> {
        &self.store
    }

    pub(crate) fn flights(&self) -> &InFlight<V> {
        &self.flights
    }

    pub fn flight_stats(&self) -> FlightStats {
        self.flights.stats()
    }

    // == Bind ==
    /// Creates a binding without running it. Call [`Binding::load`] to
    /// activate it.
    pub fn bind<F>(&self, key: impl Into<String>, fetcher: F, options: BindOptions) -> Binding<V>
    where
        F: Fetcher<V>,
    {
        self.bind_shared(key, Arc::new(fetcher), options)
    }

    /// Like [`bind`](Self::bind), keeping the caller's fetcher handle so a
    /// later rebind with the same handle counts as unchanged.
    pub fn bind_shared(
        &self,
        key: impl Into<String>,
        fetcher: SharedFetcher<V>,
        options: BindOptions,
    ) -> Binding<V> {
        Binding::new(self.clone(), key.into(), fetcher, options)
    }

    // == Mount ==
    /// Creates a binding and runs it once, the way a view does on mount.
    pub async fn mount<F>(
        &self,
        key: impl Into<String>,
        fetcher: F,
        options: BindOptions,
    ) -> Binding<V>
    where
        F: Fetcher<V>,
    {
        let binding = self.bind(key, fetcher, options);
        binding.load().await;
        binding
    }
}
