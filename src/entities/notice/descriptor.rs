//! Route descriptor for the notice board

use axum::{Router, routing::get};

use super::handlers::{create_notice, delete_notice, list_notices, update_notice};
use crate::server::{AppState, EntityDescriptor};

pub struct NoticeDescriptor;

impl EntityDescriptor for NoticeDescriptor {
    fn entity_type(&self) -> &str {
        "notice"
    }

    fn plural(&self) -> &str {
        "notices"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/notices", get(list_notices).post(create_notice))
            .route("/notices/{id}", axum::routing::put(update_notice).delete(delete_notice))
            .with_state(state)
    }
}
