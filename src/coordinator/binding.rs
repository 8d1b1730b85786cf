//! Binding Module
//!
//! A binding ties one cache key and one fetcher into a read-through cache
//! with observable loading/error state.
//!
//! # Run algorithm
//! 1. Disabled bindings do nothing.
//! 2. `is_loading = true`, `error` cleared.
//! 3. Unless forced, a fresh store entry is served and the fetcher is not
//!    called.
//! 4. Otherwise the fetch goes through the in-flight registry; success sets
//!    `data` (the registry writes the store), failure sets `error` and keeps
//!    `data`.
//! 5. `is_loading = false`.
//!
//! Overlapping runs on one binding resolve last-invocation-wins: each run
//! takes a generation ticket and only the newest ticket may publish. Runs
//! finishing after teardown publish nothing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::coordinator::fetcher::same_fetcher;
use crate::coordinator::{BindOptions, QueryClient, QueryState, SharedFetcher};

struct BindingConfig<V> {
    key: String,
    fetcher: SharedFetcher<V>,
    options: BindOptions,
}

struct BindingInner<V> {
    client: QueryClient<V>,
    config: Mutex<BindingConfig<V>>,
    state: watch::Sender<QueryState<V>>,
    generation: AtomicU64,
    torn_down: AtomicBool,
}

impl<V> BindingInner<V> {
    /// Applies `update` if `ticket` is still the newest run and the binding
    /// is alive. Returns whether the update was applied.
    fn publish(&self, ticket: u64, update: impl FnOnce(&mut QueryState<V>)) -> bool {
        if self.torn_down.load(Ordering::Acquire) {
            debug!("binding torn down, discarding state update");
            return false;
        }
        if self.generation.load(Ordering::Acquire) != ticket {
            debug!(ticket, "superseded run, discarding state update");
            return false;
        }
        self.state.send_modify(update);
        true
    }
}

// == Binding ==
/// One key/fetcher pair driven by a consuming view.
///
/// Dropping the binding tears it down.
pub struct Binding<V> {
    inner: Arc<BindingInner<V>>,
}

impl<V> Binding<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        client: QueryClient<V>,
        key: String,
        fetcher: SharedFetcher<V>,
        options: BindOptions,
    ) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            inner: Arc::new(BindingInner {
                client,
                config: Mutex::new(BindingConfig {
                    key,
                    fetcher,
                    options,
                }),
                state,
                generation: AtomicU64::new(0),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn key(&self) -> String {
        self.inner.config.lock().key.clone()
    }

    pub fn options(&self) -> BindOptions {
        self.inner.config.lock().options
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<V> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> Option<V> {
        self.inner.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<V>> {
        self.inner.state.subscribe()
    }

    // == Load ==
    /// Runs the binding, serving from cache when fresh.
    pub async fn load(&self) {
        Self::run(Arc::clone(&self.inner), false).await;
    }

    // == Refresh ==
    /// Runs the binding skipping the cache read. The result is still written
    /// back to the store.
    pub async fn refresh(&self) {
        Self::run(Arc::clone(&self.inner), true).await;
    }

    /// Detached [`load`](Self::load). Requires a tokio runtime.
    pub fn spawn_load(&self) -> JoinHandle<()> {
        tokio::spawn(Self::run(Arc::clone(&self.inner), false))
    }

    /// Detached [`refresh`](Self::refresh). Requires a tokio runtime.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        tokio::spawn(Self::run(Arc::clone(&self.inner), true))
    }

    // == Invalidate ==
    /// Removes this binding's key from the store without fetching.
    pub fn invalidate(&self) -> bool {
        let key = self.key();
        self.inner.client.store().invalidate(&key)
    }

    // == Rebind ==
    /// Replaces the key, fetcher or options.
    ///
    /// Re-runs when anything changed (fetchers compare by handle identity)
    /// and returns whether it did. Runs still in flight for the previous
    /// configuration no longer publish.
    pub async fn rebind(
        &self,
        key: impl Into<String>,
        fetcher: SharedFetcher<V>,
        options: BindOptions,
    ) -> bool {
        let key = key.into();
        {
            let mut config = self.inner.config.lock();
            let unchanged = config.key == key
                && config.options == options
                && same_fetcher(&config.fetcher, &fetcher);
            if unchanged {
                return false;
            }
            debug!(from = %config.key, to = %key, "rebinding");
            *config = BindingConfig {
                key,
                fetcher,
                options,
            };
        }

        let ticket = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if !options.enabled {
            // The abandoned attempt is no longer in flight for this binding.
            self.inner.publish(ticket, |state| state.is_loading = false);
            return true;
        }

        Self::run(Arc::clone(&self.inner), false).await;
        true
    }

    /// Tears the binding down. Equivalent to dropping it.
    pub fn teardown(self) {}

    async fn run(inner: Arc<BindingInner<V>>, force: bool) {
        let (key, fetcher, options) = {
            let config = inner.config.lock();
            (
                config.key.clone(),
                Arc::clone(&config.fetcher),
                config.options,
            )
        };

        if !options.enabled {
            debug!(key = %key, "binding disabled, skipping run");
            return;
        }

        let ticket = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if !inner.publish(ticket, |state| {
            state.is_loading = true;
            state.error = None;
        }) {
            return;
        }

        if !force {
            if let Some(value) = inner.client.store().get(&key) {
                inner.publish(ticket, |state| {
                    state.data = Some(value);
                    state.is_loading = false;
                });
                return;
            }
        }

        let result = inner
            .client
            .flights()
            .fetch(&key, fetcher.as_ref(), options.ttl)
            .await;

        match result {
            Ok(value) => {
                inner.publish(ticket, |state| {
                    state.data = Some(value);
                    state.is_loading = false;
                });
            }
            Err(err) => {
                warn!(key = %key, error = %err, "fetch failed");
                inner.publish(ticket, |state| {
                    state.error = Some(err);
                    state.is_loading = false;
                });
            }
        }
    }
}

impl<V> Drop for Binding<V> {
    fn drop(&mut self) {
        self.inner.torn_down.store(true, Ordering::Release);
    }
}
