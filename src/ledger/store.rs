//! Storage seam for invoices and their payments

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::core::error::SchoolResult;
use crate::entities::invoice::{Invoice, InvoiceRecord};
use crate::entities::payment::{Payment, PaymentDraft};
use crate::ledger::recorder::PaymentTarget;

/// Invoices and payments live behind one store so that choosing the invoice
/// to pay and appending the payment happen in a single critical section.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_invoice(&self, invoice: Invoice) -> SchoolResult<Invoice>;

    async fn get_invoice(&self, id: &Uuid) -> SchoolResult<Option<InvoiceRecord>>;

    /// Invoices with their payments, newest first. Invoices created at the
    /// same instant list the most recently inserted first.
    async fn list_invoices(&self, student_id: Option<&Uuid>) -> SchoolResult<Vec<InvoiceRecord>>;

    /// Select the target invoice and append a payment atomically
    async fn record_payment(
        &self,
        target: PaymentTarget,
        draft: PaymentDraft,
        policy: LedgerConfig,
    ) -> SchoolResult<Payment>;

    /// Store an already-built payment, keeping its id and timestamp (seeding).
    /// The overpayment rule of `policy` still applies.
    async fn import_payment(&self, payment: Payment, policy: LedgerConfig)
    -> SchoolResult<Payment>;
}
