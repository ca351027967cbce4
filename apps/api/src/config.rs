//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults.

use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// Deployment environment label reported by the healthcheck.
    pub environment: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("VENDO_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDO_PORT".to_string()))?,

            database_path: env::var("VENDO_DB_PATH").unwrap_or_else(|_| "vendo.db".to_string()),

            environment: env::var("VENDO_ENV").unwrap_or_else(|_| "development".to_string()),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
