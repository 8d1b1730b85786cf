//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the REST backend
    pub backend_url: String,
    /// API key sent to the REST backend, if any
    pub backend_api_key: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BACKEND_URL` - REST backend base URL (default: http://localhost:54321)
    /// - `BACKEND_API_KEY` - REST backend API key (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            backend_url: env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            backend_api_key: env::var("BACKEND_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// Rejects settings the cache cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "DEFAULT_TTL_MS must be greater than zero".to_string(),
            ));
        }
        if self.backend_url.is_empty() {
            return Err(CacheError::InvalidConfig(
                "BACKEND_URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
            backend_url: "http://localhost:54321".to_string(),
            backend_api_key: None,
        }
    }
}
