//! REST API exposure
//!
//! Consumes a `ServerHost` and produces the Axum `Router`: health checks,
//! the registered CRUD resources, the workflow routes and any custom
//! routes, all sharing one `AppState`.

use super::super::host::ServerHost;
use crate::server::router::build_workflow_routes;
use crate::server::state::AppState;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing the state and entity registry
    /// * `custom_routes` - Additional custom routes to merge
    ///
    /// # Returns
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - Entity CRUD routes
    /// - Workflow routes
    /// - Custom routes
    /// - Request tracing, plus permissive CORS when configured
    pub fn build_router(
        host: Arc<ServerHost>,
        custom_routes: Vec<Router<AppState>>,
    ) -> Result<Router> {
        let health_routes = Self::health_routes();
        let entity_routes = host.entity_registry.build_routes();
        let workflow_routes = build_workflow_routes();

        let mut app = health_routes.merge(entity_routes).merge(workflow_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let mut app = app
            .with_state(host.state.clone())
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

        if host.config().server.permissive_cors {
            app = app.layer(CorsLayer::permissive());
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router<AppState> {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "market-rs"
        }))
    }
}
