//! Route descriptor for ledger views

use axum::{Router, routing::get};

use super::handlers::{list_ledger, student_ledger};
use crate::server::{AppState, EntityDescriptor};

pub struct LedgerDescriptor;

impl EntityDescriptor for LedgerDescriptor {
    fn entity_type(&self) -> &str {
        "ledger"
    }

    fn plural(&self) -> &str {
        "ledger"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/ledger", get(list_ledger))
            .route("/students/{id}/ledger", get(student_ledger))
            .with_state(state)
    }
}
