//! User service configuration.

use std::env;

use common::{env_parse, DatabaseConfig, Environment};

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Deployment environment
    pub env: Environment,
    /// Database connection pool settings
    pub database: DatabaseConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = DatabaseConfig {
            url: env::var("USER_SERVICE_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.database.url),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database.max_connections),
            ..defaults.database
        };

        Self {
            env: Environment::from_env(),
            database,
            host: env::var("USER_SERVICE_HOST").unwrap_or(defaults.host),
            port: env_parse("USER_SERVICE_PORT").unwrap_or(defaults.port),
        }
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            database: DatabaseConfig::default(),
            host: "0.0.0.0".to_string(),
            port: 50052,
        }
    }
}
