//! Backend Module
//!
//! Adapters that present remote data services as fetchers.

mod rest;

pub use rest::RestSource;

use futures::future::BoxFuture;
use serde_json::Value;

// == Collection Source ==
/// A backend that can list the rows of a named collection.
pub trait CollectionSource: Send + Sync + 'static {
    fn list(&self, collection: &str) -> BoxFuture<'static, anyhow::Result<Value>>;
}
