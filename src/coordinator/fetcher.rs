//! Fetcher capability
//!
//! Anything that can produce the authoritative value for a key on demand.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

/// Future returned by a fetcher.
pub type FetchFuture<V> = BoxFuture<'static, anyhow::Result<V>>;

/// Shared handle to a fetcher. Its pointer identity is what a binding
/// compares when deciding whether a rebind changed the fetcher.
pub type SharedFetcher<V> = Arc<dyn Fetcher<V>>;

// == Fetcher ==
/// Zero-argument asynchronous value producer.
///
/// Implemented for every `Fn() -> impl Future<Output = anyhow::Result<V>>`.
pub trait Fetcher<V>: Send + Sync + 'static {
    fn fetch(&self) -> FetchFuture<V>;
}

impl<V, F, Fut> Fetcher<V> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    fn fetch(&self) -> FetchFuture<V> {
        Box::pin(self())
    }
}

/// Whether two handles point at the same fetcher.
pub(crate) fn same_fetcher<V>(a: &SharedFetcher<V>, b: &SharedFetcher<V>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
