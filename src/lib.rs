//! Lab Cache - TTL read-through cache for the labs dashboard
//!
//! Provides a lazily expiring key-value store, fetch coordinator bindings
//! with single-flight de-duplication, and an HTTP gateway serving cached
//! backend collections.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::CacheStore;
pub use config::Config;
pub use coordinator::{BindOptions, Binding, QueryClient, QueryState};
pub use error::{CacheError, FetchError};
