//! Route descriptor for payments

use axum::{Router, routing::post};

use super::handlers::{record_payment, record_student_payment};
use crate::server::{AppState, EntityDescriptor};

pub struct PaymentDescriptor;

impl EntityDescriptor for PaymentDescriptor {
    fn entity_type(&self) -> &str {
        "payment"
    }

    fn plural(&self) -> &str {
        "payments"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/payments", post(record_payment))
            .route("/students/{id}/payments", post(record_student_payment))
            .with_state(state)
    }
}
