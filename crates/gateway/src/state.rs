//! Application state for dependency injection.

use std::sync::Arc;

use domain::{CancellationToken, RequestContext};

use crate::config::GatewayConfig;
use crate::service::UserService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub config: GatewayConfig,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create new app state.
    pub fn new(user_service: Arc<dyn UserService>, config: GatewayConfig) -> Self {
        Self {
            user_service,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel every in-flight request context once `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Fresh context for one inbound request, bounded by the configured timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::child_of(&self.shutdown).timeout(self.config.request_timeout())
    }
}
