//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint. Every collection request
//! mounts a fresh binding, so repeated reads within the TTL are served from
//! the shared store and concurrent misses share one backend call.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::backend::{CollectionSource, RestSource};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::coordinator::{BindOptions, Binding, QueryClient};
use crate::error::{CacheError, Result};
use crate::models::{
    collection_key, validate_collection_name, CollectionResponse, HealthResponse,
    InvalidateQuery, InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bindings factory over the shared store
    pub client: QueryClient<Value>,
    /// Backend the collections are read from
    pub source: Arc<dyn CollectionSource>,
}

impl AppState {
    /// Creates a new AppState over the given store and backend.
    pub fn new(store: CacheStore<Value>, source: Arc<dyn CollectionSource>) -> Self {
        Self {
            client: QueryClient::new(Arc::new(store)),
            source,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses the system clock and the REST backend named in the Config.
    pub fn from_config(config: &Config) -> Self {
        let store = CacheStore::new(config.default_ttl());
        Self::new(store, Arc::new(RestSource::from_config(config)))
    }

    /// Binds the listing of `name` to its cache key.
    fn bind_collection(&self, name: &str) -> Result<Binding<Value>> {
        if let Some(error_msg) = validate_collection_name(name) {
            return Err(CacheError::InvalidRequest(error_msg));
        }

        let source = Arc::clone(&self.source);
        let collection = name.to_string();
        let fetcher = move || source.list(&collection);

        Ok(self
            .client
            .bind(collection_key(name), fetcher, BindOptions::default()))
    }
}

/// Turns a settled binding into a response. A failure with nothing cached
/// to fall back on is a gateway error; otherwise stale data is served with
/// the error attached.
fn settle(binding: &Binding<Value>) -> Result<Json<CollectionResponse>> {
    let state = binding.state();
    if let (None, Some(err)) = (&state.data, &state.error) {
        return Err(CacheError::Fetch(err.clone()));
    }
    Ok(Json(CollectionResponse::from_state(binding.key(), state)))
}

/// Handler for GET /collections/:name
pub async fn collection_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CollectionResponse>> {
    let binding = state.bind_collection(&name)?;
    binding.load().await;
    settle(&binding)
}

/// Handler for POST /collections/:name/refresh
///
/// Refetches regardless of freshness and overwrites the cached listing.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CollectionResponse>> {
    let binding = state.bind_collection(&name)?;
    binding.refresh().await;
    settle(&binding)
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.client.store().invalidate(&key);
    Json(InvalidateResponse::key(&key, removed))
}

/// Handler for DELETE /cache
///
/// With `?pattern=p` removes every key containing `p`; without it clears
/// the whole store.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let store = state.client.store();
    let response = match query.pattern.as_deref() {
        Some(pattern) => InvalidateResponse::pattern(pattern, store.invalidate_pattern(pattern)),
        None => InvalidateResponse::cleared(store.clear()),
    };
    Ok(Json(response))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.client.store().stats(),
        state.client.flight_stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
