use sea_orm::ConnectOptions;
use std::time::Duration;
use tracing::log::LevelFilter;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_required};

/// PostgreSQL database configuration
///
/// Holds the connection URL and pool settings. Construct manually or load
/// from environment variables (with the `config` feature).
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    /// Database connection URL (required)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,

    /// Enable SQL query logging
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    /// Create a new PostgresConfig with default pool settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
            sqlx_logging: true,
        }
    }

    /// Convert into SeaORM ConnectOptions for use with `connect_with_options`
    pub fn into_connect_options(self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url);
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        options
    }
}

#[cfg(feature = "config")]
impl FromEnv for PostgresConfig {
    /// Reads from environment variables:
    /// - DATABASE_URL (required)
    /// - DB_MAX_CONNECTIONS (default 20)
    /// - DB_MIN_CONNECTIONS (default 2)
    /// - DB_CONNECT_TIMEOUT_SECS / DB_ACQUIRE_TIMEOUT_SECS (default 8)
    /// - DB_SQLX_LOGGING (default true)
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("DATABASE_URL")?;

        let parse_u64 = |key: &str, default: &str| -> Result<u64, ConfigError> {
            env_or_default(key, default)
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: key.to_string(),
                    details: format!("{}", e),
                })
        };

        Ok(Self {
            url,
            max_connections: parse_u64("DB_MAX_CONNECTIONS", "20")? as u32,
            min_connections: parse_u64("DB_MIN_CONNECTIONS", "2")? as u32,
            connect_timeout_secs: parse_u64("DB_CONNECT_TIMEOUT_SECS", "8")?,
            acquire_timeout_secs: parse_u64("DB_ACQUIRE_TIMEOUT_SECS", "8")?,
            sqlx_logging: env_or_default("DB_SQLX_LOGGING", "true") == "true",
        })
    }
}
