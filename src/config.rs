//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the dispatcher listens on
    pub server_port: u16,
    /// Maximum number of concurrently served client connections
    pub max_connections: usize,
    /// Maximum number of entries each cache can hold
    pub cache_capacity: usize,
    /// Idle timeout in seconds before a cache entry goes stale
    pub cache_timeout: u64,
    /// Background cache sweep interval in seconds
    pub sweep_interval: u64,
    /// Statistics window length in seconds
    pub stats_window: u64,
    /// Wall-clock budget in seconds for path searches
    pub path_budget: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Dispatcher TCP port (default: 4949)
    /// - `MAX_CONNECTIONS` - Concurrent connection limit (default: 32)
    /// - `CACHE_CAPACITY` - Maximum entries per cache (default: 32)
    /// - `CACHE_TIMEOUT` - Entry idle timeout in seconds (default: 3600)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `STATS_WINDOW` - Statistics window in seconds (default: 30)
    /// - `PATH_BUDGET` - Path search budget in seconds (default: 290)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4949),
            max_connections: env::var("MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32),
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32),
            cache_timeout: env::var("CACHE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            stats_window: env::var("STATS_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            path_budget: env::var("PATH_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(290),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 4949,
            max_connections: 32,
            cache_capacity: 32,
            cache_timeout: 3600,
            sweep_interval: 1,
            stats_window: 30,
            path_budget: 290,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 4949);
        assert_eq!(config.max_connections, 32);
        assert_eq!(config.cache_capacity, 32);
        assert_eq!(config.cache_timeout, 3600);
        assert_eq!(config.sweep_interval, 1);
        assert_eq!(config.stats_window, 30);
        assert_eq!(config.path_budget, 290);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("MAX_CONNECTIONS");
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_TIMEOUT");
        env::remove_var("SWEEP_INTERVAL");
        env::remove_var("STATS_WINDOW");
        env::remove_var("PATH_BUDGET");

        let config = Config::from_env();
        assert_eq!(config.server_port, 4949);
        assert_eq!(config.cache_capacity, 32);
        assert_eq!(config.cache_timeout, 3600);
        assert_eq!(config.stats_window, 30);
    }
}
