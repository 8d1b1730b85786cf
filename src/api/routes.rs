//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    collection_handler, health_handler, invalidate_handler, invalidate_key_handler,
    refresh_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /collections/:name` - Cached collection listing
/// - `POST /collections/:name/refresh` - Refetch a collection, bypassing the cache
/// - `DELETE /cache/:key` - Invalidate one key
/// - `DELETE /cache` - Invalidate by `?pattern=`, or clear everything
/// - `GET /stats` - Cache and fetch statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, for the dashboard front end
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/collections/:name", get(collection_handler))
        .route("/collections/:name/refresh", post(refresh_handler))
        .route("/cache", delete(invalidate_handler))
        .route("/cache/:key", delete(invalidate_key_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
