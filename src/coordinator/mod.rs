//! Fetch Coordinator Module
//!
//! Read-through bindings over a [`CacheStore`](crate::cache::CacheStore)
//! with loading/error state, manual refresh and invalidation, and
//! single-flight fetch de-duplication.

mod binding;
mod client;
mod fetcher;
mod flight;
mod state;

pub use binding::Binding;
pub use client::QueryClient;
pub use fetcher::{FetchFuture, Fetcher, SharedFetcher};
pub use flight::{FlightStats, InFlight, SharedFetch};
pub use state::{BindOptions, QueryState};
