//! Route descriptor for invoices

use axum::{Router, routing::get};

use super::handlers::{create_invoice, get_invoice, list_invoices};
use crate::server::{AppState, EntityDescriptor};

pub struct InvoiceDescriptor;

impl EntityDescriptor for InvoiceDescriptor {
    fn entity_type(&self) -> &str {
        "invoice"
    }

    fn plural(&self) -> &str {
        "invoices"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/invoices", get(list_invoices).post(create_invoice))
            .route("/invoices/{id}", get(get_invoice))
            .with_state(state)
    }
}
