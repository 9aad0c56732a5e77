//! Gateway configuration.

use std::env;
use std::time::Duration;

use common::{env_parse, Environment, GrpcClientConfig};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deployment environment
    pub env: Environment,
    /// User service gRPC client settings
    pub user_service: GrpcClientConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            env: Environment::from_env(),
            user_service: GrpcClientConfig {
                endpoint: env::var("USER_SERVICE_URL").unwrap_or(defaults.user_service.endpoint),
                request_timeout_ms: env_parse("GATEWAY_REQUEST_TIMEOUT_MS"),
                ..defaults.user_service
            },
            host: env::var("GATEWAY_HOST").unwrap_or(defaults.host),
            port: env_parse("GATEWAY_PORT").unwrap_or(defaults.port),
        }
    }

    /// Per-request deadline budget, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.user_service
            .request_timeout_ms
            .map(Duration::from_millis)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            user_service: GrpcClientConfig::default(),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
