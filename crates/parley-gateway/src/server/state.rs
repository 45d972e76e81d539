//! Gateway state
//!
//! Shared dependencies for the WebSocket handler.

use crate::connection::ConnectionRegistry;
use parley_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and the event bus
    service_context: Arc<ServiceContext>,
    /// Registry of live connections
    registry: Arc<ConnectionRegistry>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(service_context: Arc<ServiceContext>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            service_context,
            registry,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .finish()
    }
}
