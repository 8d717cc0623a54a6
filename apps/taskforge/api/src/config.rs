use axum_helpers::JwtConfig;
use core_config::{FromEnv, server::ServerConfig};
use database::postgres::PostgresConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - fails if DATABASE_URL unset
        let server = ServerConfig::from_env()?; // Defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env()?; // Required - fails if JWT_SECRET unset

        Ok(Self {
            database,
            server,
            jwt,
            environment,
        })
    }
}
