//! Invoice model and its read-side views

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::SchoolResult;
use crate::core::validation::{require_fields, required_str, required_uuid};
use crate::entities::payment::Payment;
use crate::ledger::amount::{parse_amount, parse_due_date};

/// A billable obligation for one student.
///
/// Amount and due date are fixed at creation. The settlement status is not
/// stored; it is derived from the payments (see [`InvoiceRecord::status`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub student_id: Uuid,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        student_id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            description: description.into(),
            amount,
            due_date,
            created_at: Utc::now(),
        }
    }
}

/// Validated `POST /invoices` body
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub student_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

impl NewInvoice {
    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        require_fields(payload, &["studentId", "description", "amount", "dueDate"])?;

        Ok(Self {
            student_id: required_uuid(payload, "studentId")?,
            description: required_str(payload, "description")?,
            amount: parse_amount("amount", &payload["amount"])?,
            due_date: parse_due_date("dueDate", &payload["dueDate"])?,
        })
    }

    pub fn into_invoice(self) -> Invoice {
        Invoice::new(self.student_id, self.description, self.amount, self.due_date)
    }
}

/// Settlement state of a single invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Partial,
    Paid,
}

/// An invoice together with the payments made against it
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
}

impl InvoiceRecord {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            invoice,
            payments: Vec::new(),
        }
    }

    /// Sum of payments, saturating at `Decimal::MAX`
    pub fn amount_paid(&self) -> Decimal {
        self.payments
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.amount_paid))
    }

    /// What is still owed, never negative
    pub fn outstanding(&self) -> Decimal {
        self.invoice
            .amount
            .saturating_sub(self.amount_paid())
            .max(Decimal::ZERO)
    }

    pub fn status(&self) -> InvoiceStatus {
        let paid = self.amount_paid();
        if paid >= self.invoice.amount {
            InvoiceStatus::Paid
        } else if paid > Decimal::ZERO {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Pending
        }
    }
}

/// Minimal student details embedded in invoice listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRef {
    pub name: String,
    pub email: String,
}

/// Wire shape of an invoice
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub status: InvoiceStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub student: Option<StudentRef>,
    pub payments: Vec<Payment>,
}

impl InvoiceView {
    pub fn new(record: InvoiceRecord, student: Option<StudentRef>) -> Self {
        let status = record.status();
        let amount_paid = record.amount_paid();
        let balance = record.outstanding();
        Self {
            invoice: record.invoice,
            status,
            amount_paid,
            balance,
            student,
            payments: record.payments,
        }
    }
}
