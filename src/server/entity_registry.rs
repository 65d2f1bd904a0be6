//! Registry of the resources exposed through generic CRUD routes

use crate::server::state::AppState;
use axum::Router;
use std::collections::BTreeMap;

/// Trait that describes how to build routes for an entity
///
/// Each resource (shop, menu, tempShop, ...) implements this trait to
/// provide its CRUD routes.
pub trait EntityDescriptor: Send + Sync {
    /// The row kind (e.g., "shop_menu")
    fn entity_type(&self) -> &str;

    /// The URL prefix (e.g., "/menu")
    fn path(&self) -> &str;

    /// Build the CRUD routes for this entity
    ///
    /// Should return a Router with routes like:
    /// - GET/POST {path}
    /// - GET/PUT/DELETE {path}/{id}
    fn build_routes(&self) -> Router<AppState>;
}

/// Registry for all exposed resources
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// The entity type name is the key; registering it again replaces the
    /// earlier descriptor.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router<AppState> {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    /// Registered entity types in sorted order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    /// URL prefix registered for `entity_type`
    pub fn path_of(&self, entity_type: &str) -> Option<&str> {
        self.descriptors.get(entity_type).map(|d| d.path())
    }
}
