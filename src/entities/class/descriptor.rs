//! Route descriptor for classes

use axum::{Router, routing::get};

use super::handlers::{create_class, list_classes};
use crate::server::{AppState, EntityDescriptor};

pub struct ClassDescriptor;

impl EntityDescriptor for ClassDescriptor {
    fn entity_type(&self) -> &str {
        "class"
    }

    fn plural(&self) -> &str {
        "classes"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/classes", get(list_classes).post(create_class))
            .with_state(state)
    }
}
