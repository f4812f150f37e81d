//! Ledger view handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reducer::{FeeStatus, LedgerSummary};
use crate::core::auth::{AuthPolicy, Role};
use crate::core::capability::{Capability, InvoiceScope};
use crate::core::error::{SchoolError, SchoolResult, ValidationError};
use crate::core::validation::parse_uuid;
use crate::core::Caller;
use crate::entities::invoice::handlers::{student_refs, views};
use crate::entities::invoice::{InvoiceRecord, InvoiceView};
use crate::entities::user::User;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// One student's line on the fee dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub student_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub summary: LedgerSummary,
}

impl LedgerRow {
    fn new(student: &User, summary: LedgerSummary) -> Self {
        Self {
            student_id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            summary,
        }
    }
}

/// A single student's ledger with the invoices behind it
#[derive(Debug, Clone, Serialize)]
pub struct StudentLedger {
    #[serde(flatten)]
    pub row: LedgerRow,
    pub invoices: Vec<InvoiceView>,
}

fn matches_search(student: &User, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => {
            let needle = needle.to_lowercase();
            student.name.to_lowercase().contains(&needle) || student.email.contains(&needle)
        }
        None => true,
    }
}

/// `GET /ledger`: every student's balance and status
pub async fn list_ledger(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(query): Query<LedgerQuery>,
) -> SchoolResult<Json<Vec<LedgerRow>>> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::ReadAllInvoices))?;

    let wanted_status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(FeeStatus::parse(raw).ok_or_else(|| {
            ValidationError::field("status", format!("unknown fee status '{}'", raw))
        })?),
    };

    let mut by_student: HashMap<Uuid, Vec<InvoiceRecord>> = HashMap::new();
    for record in state.ledger.list_invoices(None).await? {
        by_student
            .entry(record.invoice.student_id)
            .or_default()
            .push(record);
    }

    let now = Utc::now();
    let mut rows = Vec::new();
    for user in state
        .users
        .list()
        .await?
        .iter()
        .filter(|u| u.role == Role::Student)
        .filter(|u| matches_search(u, query.search.as_deref()))
    {
        let records = by_student.remove(&user.id).unwrap_or_default();
        let summary = LedgerSummary::from_records(&records, now)?;
        if wanted_status.is_none_or(|s| summary.status == s) {
            rows.push(LedgerRow::new(user, summary));
        }
    }

    Ok(Json(rows))
}

/// `GET /students/{id}/ledger`: one student's summary; students only see their own
pub async fn student_ledger(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> SchoolResult<Json<StudentLedger>> {
    let id = parse_uuid(&id)?;
    let (user_id, _) = ctx.require_user()?;
    match state.capabilities_of(&ctx)?.invoice_scope {
        InvoiceScope::All => {}
        InvoiceScope::Own if user_id == id => {}
        InvoiceScope::Own | InvoiceScope::None => {
            return Err(SchoolError::forbidden("ledger belongs to another student"));
        }
    }

    let student = state.require_student(id).await?;
    let records = state.ledger.list_invoices(Some(&id)).await?;
    let summary = LedgerSummary::from_records(&records, Utc::now())?;
    let students = student_refs(&state).await?;

    Ok(Json(StudentLedger {
        row: LedgerRow::new(&student, summary),
        invoices: views(records, &students),
    }))
}
