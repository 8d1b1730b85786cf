//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::coordinator::{FlightStats, QueryState};

/// Response body for collection reads (GET /collections/:name and
/// POST /collections/:name/refresh)
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResponse {
    /// Cache key backing the collection
    pub key: String,
    /// Last successfully fetched rows
    pub data: Option<Value>,
    /// Failure of the latest attempt, when stale data is being served
    pub error: Option<String>,
}

impl CollectionResponse {
    /// Builds the response from a settled binding state
    pub fn from_state(key: impl Into<String>, state: QueryState<Value>) -> Self {
        Self {
            key: key.into(),
            data: state.data,
            error: state.error.map(|err| err.to_string()),
        }
    }
}

/// Response body for invalidation (DELETE /cache, DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Human-readable summary
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn key(key: &str, removed: bool) -> Self {
        let message = if removed {
            format!("Key '{}' invalidated", key)
        } else {
            format!("Key '{}' was not cached", key)
        };
        Self {
            message,
            removed: usize::from(removed),
        }
    }

    pub fn pattern(pattern: &str, removed: usize) -> Self {
        Self {
            message: format!("Invalidated {} entries matching '{}'", removed, pattern),
            removed,
        }
    }

    pub fn cleared(removed: usize) -> Self {
        Self {
            message: format!("Cleared {} entries", removed),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Store counters
    pub cache: CacheStats,
    /// Fetch de-duplication counters
    pub flights: FlightStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, flights: FlightStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            flights,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use serde_json::json;

    #[test]
    fn test_collection_response_from_state() {
        let state = QueryState {
            data: Some(json!([{"id": 1}])),
            is_loading: false,
            error: Some(FetchError::new("labs-list", anyhow::anyhow!("timeout"))),
        };

        let resp = CollectionResponse::from_state("labs-list", state);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "labs-list");
        assert_eq!(json["data"], json!([{"id": 1}]));
        assert!(json["error"].as_str().unwrap().contains("timeout"));
    }

    #[test]
    fn test_invalidate_response_messages() {
        assert_eq!(InvalidateResponse::key("k", true).removed, 1);
        assert_eq!(InvalidateResponse::key("k", false).removed, 0);
        assert!(InvalidateResponse::pattern("labs", 3).message.contains("labs"));
        assert_eq!(InvalidateResponse::cleared(5).removed, 5);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let cache = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(cache, FlightStats::default());
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
