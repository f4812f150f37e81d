//! Payment HTTP handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use super::model::{Payment, PaymentDraft};
use crate::core::auth::AuthPolicy;
use crate::core::capability::Capability;
use crate::core::error::SchoolResult;
use crate::core::validation::{parse_uuid, require_fields, required_uuid};
use crate::core::{Caller, JsonBody};
use crate::server::AppState;

/// `POST /payments`: pay a specific invoice
pub async fn record_payment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<Payment>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::RecordPayments))?;

    require_fields(&payload, &["invoiceId"])?;
    let invoice_id = required_uuid(&payload, "invoiceId")?;
    let draft = PaymentDraft::from_payload(&payload)?;

    let payment = state.recorder.record_for_invoice(invoice_id, draft).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// `POST /students/{id}/payments`: pay the student's first unpaid invoice
pub async fn record_student_payment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<Payment>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::RecordPayments))?;

    let student = state.require_student(parse_uuid(&id)?).await?;
    let draft = PaymentDraft::from_payload(&payload)?;

    let payment = state.recorder.record_for_student(student.id, draft).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
