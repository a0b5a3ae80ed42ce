//! Application state shared across handlers.

use std::sync::Arc;

use noteful_core::RESOURCES;
use noteful_store::{QueryBackend, ResourceService};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Built once at startup: every resource service receives the same explicit
/// backend handle. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// One service per mounted resource, in [`RESOURCES`] order.
    services: Arc<[ResourceService]>,
}

impl AppState {
    /// Create new application state over `backend`.
    pub fn new(backend: Arc<dyn QueryBackend>, config: ServerConfig) -> Self {
        let services = RESOURCES
            .iter()
            .map(|&resource| ResourceService::new(resource, Arc::clone(&backend)))
            .collect();

        Self {
            config: Arc::new(config),
            services,
        }
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Every resource service.
    pub fn services(&self) -> &[ResourceService] {
        &self.services
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("services", &self.services.len())
            .finish()
    }
}
