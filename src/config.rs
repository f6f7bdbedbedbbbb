//! Configuration Module
//!
//! Loads repository and server settings from environment variables.
//! Store host and credentials belong to whoever constructs the store.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the store collection (CouchDB database) holding cache documents
    pub collection: String,
    /// Deadline in milliseconds for a single store operation
    pub store_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Housekeeping pass interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_COLLECTION` - Collection name (default: cache)
    /// - `STORE_TIMEOUT_MS` - Store operation deadline in ms (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Housekeeping frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            collection: env::var("CACHE_COLLECTION")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.collection),
            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store_timeout_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Store operation deadline as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: "cache".to_string(),
            store_timeout_ms: 5000,
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.collection, "cache");
        assert_eq!(config.store_timeout_ms, 5000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_COLLECTION");
        env::remove_var("STORE_TIMEOUT_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.collection, "cache");
        assert_eq!(config.store_timeout_ms, 5000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }
}
