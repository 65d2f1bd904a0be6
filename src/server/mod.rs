//! HTTP server for the marketplace
//!
//! `ServerBuilder` registers:
//! - generic CRUD routes for every table
//! - workflow routes (approval, staging, delete bins, cascading deletes)
//! - multipart photo uploads and the read-only views

pub mod builder;
pub mod crud;
pub mod entity_registry;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod router;
pub mod state;
pub mod upload;

pub use builder::ServerBuilder;
pub use crud::RecordDescriptor;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use host::ServerHost;
pub use state::AppState;
