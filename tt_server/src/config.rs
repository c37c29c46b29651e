//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use tennis_tournament::db::DatabaseConfig;
use tennis_tournament::tournament::AdmissionPolicy;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default allowed CORS origins
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Registration admission behaviour
    pub admission: AdmissionPolicy,
    /// Prometheus exporter address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_days: i64,
}

/// Command-line overrides, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(overrides: Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_addr(&lookup, "SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000))),
        };

        let metrics_bind = match overrides.metrics_bind {
            Some(addr) => Some(addr),
            None => parse_addr(&lookup, "METRICS_BIND")?,
        };

        let mut database = DatabaseConfig::from_lookup(&lookup);
        if let Some(url) = overrides.database_url {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            lookup("PASSWORD_PEPPER").ok_or_else(|| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            access_token_minutes: parse_or(&lookup, "ACCESS_TOKEN_MINUTES", 60 * 24 * 7),
            refresh_token_days: parse_or(&lookup, "REFRESH_TOKEN_DAYS", 30),
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let admission = AdmissionPolicy::new(parse_or(
            &lookup,
            "ENFORCE_REGISTRATION_DEADLINE",
            false,
        ));

        Ok(ServerConfig {
            bind,
            database,
            security,
            cors_origins,
            admission,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.security.access_token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_MINUTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.security.refresh_token_days <= 0 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_TOKEN_DAYS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.cors_origins.is_empty() {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS".to_string(),
                reason: "At least one origin is required".to_string(),
            });
        }

        for origin in &self.cors_origins {
            let has_scheme = origin.starts_with("http://") || origin.starts_with("https://");
            if !has_scheme || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS".to_string(),
                    reason: format!("'{origin}' is not a valid http(s) origin"),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable with default fallback
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Addresses are not silently defaulted: a malformed value is an error
fn parse_addr<F>(lookup: &F, key: &str) -> Result<Option<SocketAddr>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{v}' is not an IP:PORT address"),
            })
        })
        .transpose()
}
