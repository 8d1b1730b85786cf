//! In-flight registry
//!
//! Single-flight de-duplication: concurrent requests for a key that is
//! already being fetched attach to the pending fetch instead of invoking the
//! fetcher again. The fetch that completes writes the store once, on behalf
//! of every attached caller.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::coordinator::Fetcher;
use crate::error::FetchError;

/// Pending fetch, awaitable by any number of callers.
pub type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

struct Flight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

// == Flight Stats ==
/// Snapshot of fetch de-duplication counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlightStats {
    /// Fetcher invocations
    pub fetches_started: u64,
    /// Requests that attached to a fetch already in flight
    pub fetches_joined: u64,
    /// Fetches currently pending
    pub in_flight: usize,
}

// == In Flight ==
pub struct InFlight<V> {
    store: Arc<CacheStore<V>>,
    flights: Arc<Mutex<HashMap<String, Flight<V>>>>,
    next_id: AtomicU64,
    started: AtomicU64,
    joined: AtomicU64,
}

impl<V> InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<CacheStore<V>>) -> Self {
        Self {
            store,
            flights: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            started: AtomicU64::new(0),
            joined: AtomicU64::new(0),
        }
    }

    // == Fetch ==
    /// Returns the pending fetch for `key`, starting one if none is running.
    ///
    /// On success the value is written to the store with `ttl` (the store
    /// default when `None`). When a caller attaches to an existing fetch, the
    /// TTL of the caller that started it applies. Failures write nothing, so
    /// a previously cached value survives. A panicking fetcher is reported as
    /// a failure and its key is released for the next fetch.
    pub fn fetch(
        &self,
        key: &str,
        fetcher: &dyn Fetcher<V>,
        ttl: Option<Duration>,
    ) -> SharedFetch<V> {
        let mut flights = self.flights.lock();

        if let Some(flight) = flights.get(key) {
            self.joined.fetch_add(1, Ordering::Relaxed);
            debug!(key, "joined in-flight fetch");
            return flight.fetch.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.started.fetch_add(1, Ordering::Relaxed);
        debug!(key, "starting fetch");

        let pending = fetcher.fetch();
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.flights);
        let owned_key = key.to_string();

        let fetch = async move {
            let result = match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    warn!(key = %owned_key, panic = message, "fetcher panicked");
                    Err(anyhow::anyhow!("fetcher panicked: {}", message))
                }
            }
            .map_err(|cause| FetchError::new(owned_key.as_str(), cause));

            if let Ok(value) = &result {
                store.set(owned_key.as_str(), value.clone(), ttl);
            }

            let mut flights = registry.lock();
            if flights.get(&owned_key).is_some_and(|f| f.id == id) {
                flights.remove(&owned_key);
            }
            result
        }
        .boxed()
        .shared();

        flights.insert(
            key.to_string(),
            Flight {
                id,
                fetch: fetch.clone(),
            },
        );
        drop(flights);

        // Fetches cannot be cancelled: keep driving this one even if every
        // caller drops its handle.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(fetch.clone().map(|_| ()));
        }

        fetch
    }

    /// Whether a fetch for `key` is pending.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.flights.lock().contains_key(key)
    }

    pub fn stats(&self) -> FlightStats {
        FlightStats {
            fetches_started: self.started.load(Ordering::Relaxed),
            fetches_joined: self.joined.load(Ordering::Relaxed),
            in_flight: self.flights.lock().len(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use serde_json::{json, Value};
    use tokio::sync::watch;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    use crate::cache::ManualClock;

    fn new_registry() -> (InFlight<Value>, Arc<CacheStore<Value>>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(CacheStore::with_clock(Duration::from_secs(60), clock));
        (InFlight::new(Arc::clone(&store)), store)
    }

    /// Fetcher that blocks until the gate opens and counts its invocations.
    fn gated_fetcher(
        gate: watch::Receiver<bool>,
        calls: Arc<AtomicUsize>,
        value: Value,
    ) -> impl Fetcher<Value> {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let mut gate = gate.clone();
            let value = value.clone();
            async move {
                gate.wait_for(|open| *open).await?;
                Ok::<_, anyhow::Error>(value)
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let (flights, store) = new_registry();
        let (gate_tx, gate_rx) = watch::channel(false);
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = gated_fetcher(gate_rx, calls.clone(), json!(["lab"]));

        let first = flights.fetch("labs-list", &fetcher, None);
        let mut second = task::spawn(flights.fetch("labs-list", &fetcher, None));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(flights.is_in_flight("labs-list"));
        assert_pending!(second.poll());

        gate_tx.send(true).unwrap();
        assert_eq!(first.await.unwrap(), json!(["lab"]));

        assert!(second.is_woken());
        assert_eq!(assert_ready_ok!(second.poll()), json!(["lab"]));

        assert!(!flights.is_in_flight("labs-list"));
        assert_eq!(store.get("labs-list"), Some(json!(["lab"])));

        let stats = flights.stats();
        assert_eq!(stats.fetches_started, 1);
        assert_eq!(stats.fetches_joined, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_sequential_requests_fetch_again() {
        let (flights, _) = new_registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, anyhow::Error>(json!(n)) }
        };

        assert_eq!(flights.fetch("k", &fetcher, None).await.unwrap(), json!(0));
        assert_eq!(flights.fetch("k", &fetcher, None).await.unwrap(), json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_writes_nothing_and_keeps_previous_value() {
        let (flights, store) = new_registry();
        store.set("k", json!("old"), None);

        let fetcher = || async { Err::<Value, _>(anyhow::anyhow!("backend down")) };
        let err = flights.fetch("k", &fetcher, None).await.unwrap_err();

        assert_eq!(err.key(), "k");
        assert!(err.to_string().contains("backend down"));
        assert_eq!(store.get("k"), Some(json!("old")));
        assert!(!flights.is_in_flight("k"));
    }

    #[tokio::test]
    async fn test_panicking_fetcher_releases_key() {
        async fn explode() -> anyhow::Result<Value> {
            panic!("backend exploded")
        }

        let (flights, store) = new_registry();
        let broken = || explode();

        let err = flights.fetch("k", &broken, None).await.unwrap_err();
        assert!(err.to_string().contains("backend exploded"));
        assert!(!flights.is_in_flight("k"));
        assert_eq!(store.get("k"), None);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let working = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(json!("recovered")) }
        };

        assert_eq!(
            flights.fetch("k", &working, None).await.unwrap(),
            json!("recovered")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("k"), Some(json!("recovered")));

        let stats = flights.stats();
        assert_eq!(stats.fetches_started, 2);
        assert_eq!(stats.fetches_joined, 0);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_dropped_callers_do_not_cancel_fetch() {
        let (flights, store) = new_registry();
        let (gate_tx, gate_rx) = watch::channel(false);
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = gated_fetcher(gate_rx, calls, json!(42));

        drop(flights.fetch("answer", &fetcher, Some(Duration::from_secs(5))));
        gate_tx.send(true).unwrap();

        for _ in 0..100 {
            if !flights.is_in_flight("answer") {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(!flights.is_in_flight("answer"));
        assert_eq!(store.get("answer"), Some(json!(42)));
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let (flights, _) = new_registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(json!(null)) }
        };

        let a = flights.fetch("labs-list", &fetcher, None);
        let b = flights.fetch("projects-list", &fetcher, None);
        let _ = tokio::join!(a, b);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(flights.stats().fetches_joined, 0);
    }
}
