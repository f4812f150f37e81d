//! Invoice HTTP handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::model::{InvoiceRecord, InvoiceView, NewInvoice, StudentRef};
use crate::core::auth::{AuthContext, AuthPolicy, Role};
use crate::core::capability::{Capability, InvoiceScope};
use crate::core::error::{SchoolError, SchoolResult};
use crate::core::events::DomainEvent;
use crate::core::validation::parse_uuid;
use crate::core::{Caller, JsonBody};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub student_id: Option<String>,
}

/// Name and email of every student, for embedding in listings
pub(crate) async fn student_refs(state: &AppState) -> SchoolResult<HashMap<Uuid, StudentRef>> {
    Ok(state
        .users
        .list()
        .await?
        .into_iter()
        .filter(|u| u.role == Role::Student)
        .map(|u| {
            (
                u.id,
                StudentRef {
                    name: u.name,
                    email: u.email,
                },
            )
        })
        .collect())
}

/// Which student's invoices the caller may read: `Some(id)` pins the listing
/// to one student, `None` means every student
fn scoped_student(
    state: &AppState,
    ctx: &AuthContext,
    requested: Option<Uuid>,
) -> SchoolResult<Option<Uuid>> {
    let (user_id, _) = ctx.require_user()?;
    match state.capabilities_of(ctx)?.invoice_scope {
        InvoiceScope::All => Ok(requested),
        InvoiceScope::Own => Ok(Some(user_id)),
        InvoiceScope::None => Err(SchoolError::forbidden("invoices are not visible to this role")),
    }
}

pub(crate) fn views(
    records: Vec<InvoiceRecord>,
    students: &HashMap<Uuid, StudentRef>,
) -> Vec<InvoiceView> {
    records
        .into_iter()
        .map(|r| {
            let student = students.get(&r.invoice.student_id).cloned();
            InvoiceView::new(r, student)
        })
        .collect()
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<InvoiceView>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::CreateInvoices))?;

    let new_invoice = NewInvoice::from_payload(&payload)?;
    let student = state.require_student(new_invoice.student_id).await?;
    let invoice = state.ledger.create_invoice(new_invoice.into_invoice()).await?;

    tracing::info!(
        invoice_id = %invoice.id,
        student_id = %invoice.student_id,
        amount = %invoice.amount,
        due_date = %invoice.due_date,
        "invoice created"
    );
    state.publish(DomainEvent::InvoiceCreated {
        invoice_id: invoice.id,
        student_id: invoice.student_id,
        amount: invoice.amount,
    });

    let view = InvoiceView::new(
        InvoiceRecord::new(invoice),
        Some(StudentRef {
            name: student.name,
            email: student.email,
        }),
    );
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(query): Query<InvoiceQuery>,
) -> SchoolResult<Json<Vec<InvoiceView>>> {
    let requested = query
        .student_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_uuid)
        .transpose()?;
    let student_id = scoped_student(&state, &ctx, requested)?;

    let records = state.ledger.list_invoices(student_id.as_ref()).await?;
    let students = student_refs(&state).await?;
    Ok(Json(views(records, &students)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> SchoolResult<Json<InvoiceView>> {
    let id = parse_uuid(&id)?;
    let allowed = scoped_student(&state, &ctx, None)?;

    let record = state
        .ledger
        .get_invoice(&id)
        .await?
        .ok_or_else(|| SchoolError::not_found("invoice", id))?;

    if allowed.is_some_and(|own| own != record.invoice.student_id) {
        return Err(SchoolError::forbidden("invoice belongs to another student"));
    }

    let student = student_refs(&state)
        .await?
        .remove(&record.invoice.student_id);
    Ok(Json(InvoiceView::new(record, student)))
}
