//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::host::ServerHost;
use super::router::register_resources;
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::files::FileStore;
use crate::core::store::Store;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the HTTP server
///
/// Every marketplace resource is registered up front; callers supply the
/// persistence gateway, the file store and the configuration.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_file_store(DirFileStore::open("./uploads").await?)
///     .with_config(AppConfig::load(None)?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn Store>>,
    files: Option<Arc<dyn FileStore>>,
    config: AppConfig,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router<AppState>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with every resource registered
    pub fn new() -> Self {
        let mut entity_registry = EntityRegistry::new();
        register_resources(&mut entity_registry);

        Self {
            store: None,
            files: None,
            config: AppConfig::default_config(),
            entity_registry,
            custom_routes: Vec::new(),
        }
    }

    /// Set the persistence gateway (required)
    pub fn with_store(mut self, store: impl Store + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared persistence gateway
    pub fn with_shared_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the upload file store (required)
    pub fn with_file_store(mut self, files: impl FileStore + 'static) -> Self {
        self.files = Some(Arc::new(files));
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes share the handler state, so they can open
    /// transactions like the built-in handlers.
    pub fn with_custom_routes(mut self, routes: Router<AppState>) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("Store is required. Call .with_store()"))?;
        let files = self
            .files
            .take()
            .ok_or_else(|| anyhow::anyhow!("FileStore is required. Call .with_file_store()"))?;

        Ok(ServerHost::new(store, files, self.config, self.entity_registry))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `addr`, serves requests and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DirFileStore, InMemoryStore};

    #[test]
    fn test_new_registers_every_resource() {
        let builder = ServerBuilder::new();
        assert_eq!(builder.entity_registry.entity_types().len(), 19);
    }

    #[test]
    fn test_build_without_store_fails() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("Store is required"));
    }

    #[tokio::test]
    async fn test_build_without_file_store_fails() {
        let err = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("FileStore is required"));
    }

    #[tokio::test]
    async fn test_build_host_keeps_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default_config();
        config.server.permissive_cors = true;

        let host = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_file_store(DirFileStore::open(dir.path()).await.unwrap())
            .with_config(config)
            .build_host()
            .unwrap();

        assert!(host.config().server.permissive_cors);
    }

    #[tokio::test]
    async fn test_build_with_custom_routes() {
        let dir = tempfile::tempdir().unwrap();
        let custom = Router::new().route("/ping", axum::routing::get(|| async { "pong" }));

        let _app = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_file_store(DirFileStore::open(dir.path()).await.unwrap())
            .with_custom_routes(custom)
            .build()
            .unwrap();
    }
}
