//! Connection settings for the SQLite store

use std::time::Duration;

/// Default location of the database file
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/budgetgov.db";

/// Default location of the governance journal
pub const DEFAULT_EVENTS_DIR: &str = "data/events";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// How long a writer waits for another writer's lock before failing
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            busy_timeout: Duration::from_secs(5),
            max_connections: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_builder_clamps_connections() {
        let config = DatabaseConfig::new("sqlite::memory:").with_max_connections(0);
        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
    }
}
