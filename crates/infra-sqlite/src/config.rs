// Store Configuration

use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "salon.db";
pub const DEFAULT_POOL_SIZE: usize = 12;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the embedded store: database location plus the pool's
/// size/timeout pair.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file (created if missing).
    pub database_path: String,
    /// Number of connections opened eagerly at startup.
    pub max_connections: usize,
    /// How long `acquire()` waits for a free connection before failing
    /// with `PoolExhausted`.
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DB_PATH.to_string(),
            max_connections: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `SALON_DB_PATH`, `SALON_POOL_SIZE` and
    /// `SALON_ACQUIRE_TIMEOUT_MS` where set and parseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_path =
            std::env::var("SALON_DB_PATH").unwrap_or(defaults.database_path);

        let max_connections = std::env::var("SALON_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let acquire_timeout = std::env::var("SALON_ACQUIRE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.acquire_timeout);

        Self {
            database_path,
            max_connections,
            acquire_timeout,
        }
    }

    /// A single-connection in-memory store, for tests.
    pub fn in_memory() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = StoreConfig::default();
        assert_eq!(config.database_path, DEFAULT_DB_PATH);
        assert_eq!(config.max_connections, DEFAULT_POOL_SIZE);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn in_memory_uses_single_connection() {
        let config = StoreConfig::in_memory();
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.max_connections, 1);
    }
}
