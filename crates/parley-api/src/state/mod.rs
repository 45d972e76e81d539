//! Application state
//!
//! Shared state for the Axum application: the service context, the live
//! connection registry (shared with the gateway route), and configuration.

use std::sync::Arc;

use parley_common::{AppConfig, JwtService};
use parley_gateway::ConnectionRegistry;
use parley_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    registry: Arc<ConnectionRegistry>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry: ConnectionRegistry::new_shared(),
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the shared service context handle
    pub fn service_context_arc(&self) -> Arc<ServiceContext> {
        self.service_context.clone()
    }

    /// Get the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the JWT service from the service context
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("registry", &self.registry)
            .finish()
    }
}
