//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create configuration through a variable lookup such as `std::env::var`
    ///
    /// Expected variables:
    /// - `DATABASE_URL`: PostgreSQL connection string (default: development URL)
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 20)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 5)
    /// - `DB_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 10)
    /// - `DB_IDLE_TIMEOUT`: Idle timeout in seconds (default: 600)
    /// - `DB_MAX_LIFETIME`: Max lifetime in seconds (default: 1800)
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::development();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME", defaults.max_lifetime_secs),
        }
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/tennis_tournament` as the database URL
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/tennis_tournament".to_string(),
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert!(config.database_url.ends_with("/tennis_tournament"));
    }

    #[test]
    fn test_from_lookup() {
        let config = DatabaseConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://db/tt".to_string()),
            "DB_MAX_CONNECTIONS" => Some("50".to_string()),
            "DB_IDLE_TIMEOUT" => Some("not a number".to_string()),
            _ => None,
        });
        assert_eq!(config.database_url, "postgres://db/tt");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.idle_timeout_secs, 600);
    }
}
