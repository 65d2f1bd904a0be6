//! Server host holding everything an exposure needs
//!
//! The host owns the entity registry and the shared state. Exposures turn
//! it into a router; only REST exists today.

use crate::config::AppConfig;
use crate::core::files::FileStore;
use crate::core::store::Store;
use crate::server::entity_registry::EntityRegistry;
use crate::server::state::AppState;
use std::sync::Arc;

/// Host context containing all server state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(store, files, config, entity_registry);
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    /// Handler state: persistence gateway, file store and configuration
    pub state: AppState,

    /// Entity registry for CRUD routes
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    pub fn new(
        store: Arc<dyn Store>,
        files: Arc<dyn FileStore>,
        config: AppConfig,
        entity_registry: EntityRegistry,
    ) -> Self {
        Self {
            state: AppState::new(store, files, config),
            entity_registry,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }
}
