//! API Module
//!
//! HTTP handlers and routing for the cache gateway.
//!
//! # Endpoints
//! - `GET /collections/:name` - Cached collection listing
//! - `POST /collections/:name/refresh` - Forced refetch
//! - `DELETE /cache/:key` - Invalidate a key
//! - `DELETE /cache` - Pattern invalidation or clear
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
