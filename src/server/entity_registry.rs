//! Entity registry: collects route descriptors and merges their routers

use std::collections::HashMap;

use axum::Router;

use crate::server::host::AppState;

/// Describes how to build the routes of one resource
pub trait EntityDescriptor: Send + Sync {
    /// Singular resource name, used as the registry key (e.g., "invoice")
    fn entity_type(&self) -> &str;

    /// Plural form used in paths (e.g., "invoices")
    fn plural(&self) -> &str;

    /// Build the resource's routes against the shared state
    fn build_routes(&self, state: AppState) -> Router;
}

/// Registry for all resources exposed by the server
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: HashMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second one with the same type replaces the first
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge every descriptor's routes into a single router
    pub fn build_routes(&self, state: &AppState) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes(state.clone()))
            })
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}
