//! Payment recorder
//!
//! Decides which invoice a payment lands on and whether it is acceptable.
//! The pure rules ([`select_target`], [`apply_payment`]) run inside the
//! store's critical section; [`PaymentRecorder`] is the service-level entry
//! point that logs and publishes the outcome.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::core::error::{LedgerError, SchoolError, SchoolResult, ValidationError};
use crate::core::events::{DomainEvent, EventBus};
use crate::entities::invoice::{InvoiceRecord, InvoiceStatus};
use crate::entities::payment::{Payment, PaymentDraft};
use crate::ledger::store::LedgerStore;

/// Where a payment should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTarget {
    /// The first unpaid invoice of this student, in listing order
    Student(Uuid),
    /// Exactly this invoice
    Invoice(Uuid),
}

/// Pick the invoice a payment applies to.
///
/// `records` must already be in listing order (newest first).
pub fn select_target<'a, I>(records: I, target: PaymentTarget) -> SchoolResult<&'a InvoiceRecord>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    match target {
        PaymentTarget::Student(student_id) => records
            .into_iter()
            .filter(|r| r.invoice.student_id == student_id)
            .find(|r| r.status() != InvoiceStatus::Paid)
            .ok_or_else(|| LedgerError::NoOutstandingInvoice { student_id }.into()),
        PaymentTarget::Invoice(invoice_id) => {
            let record = records
                .into_iter()
                .find(|r| r.invoice.id == invoice_id)
                .ok_or_else(|| SchoolError::not_found("invoice", invoice_id))?;
            if record.status() == InvoiceStatus::Paid {
                return Err(LedgerError::InvoiceAlreadyPaid { invoice_id }.into());
            }
            Ok(record)
        }
    }
}

/// Check that `amount` may be paid against `record` under `policy`
pub fn admit_payment(
    record: &InvoiceRecord,
    amount: Decimal,
    policy: LedgerConfig,
) -> SchoolResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::field("amountPaid", "must be greater than zero").into());
    }

    let outstanding = record.outstanding();
    if !policy.allow_overpayment && amount > outstanding {
        return Err(LedgerError::Overpayment {
            invoice_id: record.invoice.id,
            outstanding,
            tendered: amount,
        }
        .into());
    }
    Ok(())
}

/// Append a payment to a selected invoice, enforcing the overpayment rule
pub fn apply_payment(
    record: &mut InvoiceRecord,
    draft: PaymentDraft,
    policy: LedgerConfig,
) -> SchoolResult<Payment> {
    admit_payment(record, draft.amount, policy)?;

    let payment = draft.into_payment(record.invoice.id);
    record.payments.push(payment.clone());
    Ok(payment)
}

/// Records payments against a [`LedgerStore`]
#[derive(Clone)]
pub struct PaymentRecorder {
    store: Arc<dyn LedgerStore>,
    policy: LedgerConfig,
    event_bus: Option<Arc<EventBus>>,
}

impl PaymentRecorder {
    pub fn new(store: Arc<dyn LedgerStore>, policy: LedgerConfig) -> Self {
        Self {
            store,
            policy,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Option<Arc<EventBus>>) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Pay the student's first unpaid invoice
    pub async fn record_for_student(
        &self,
        student_id: Uuid,
        draft: PaymentDraft,
    ) -> SchoolResult<Payment> {
        self.record(PaymentTarget::Student(student_id), draft).await
    }

    /// Pay a specific invoice
    pub async fn record_for_invoice(
        &self,
        invoice_id: Uuid,
        draft: PaymentDraft,
    ) -> SchoolResult<Payment> {
        self.record(PaymentTarget::Invoice(invoice_id), draft).await
    }

    async fn record(&self, target: PaymentTarget, draft: PaymentDraft) -> SchoolResult<Payment> {
        let payment = match self.store.record_payment(target, draft, self.policy).await {
            Ok(payment) => payment,
            Err(e) => {
                tracing::warn!(?target, error = %e, "payment rejected");
                return Err(e);
            }
        };

        tracing::info!(
            payment_id = %payment.id,
            invoice_id = %payment.invoice_id,
            amount = %payment.amount_paid,
            method = %payment.payment_method,
            "payment recorded"
        );

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::PaymentRecorded {
                payment_id: payment.id,
                invoice_id: payment.invoice_id,
                amount_paid: payment.amount_paid,
            });
        }
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::invoice::Invoice;
    use crate::entities::payment::PaymentMethod;
    use crate::storage::InMemoryLedgerStore;
    use chrono::{Duration, NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn invoice_for(student_id: Uuid, amount: Decimal, age_minutes: i64) -> Invoice {
        let mut invoice = Invoice::new(
            student_id,
            "Term fee",
            amount,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        );
        invoice.created_at = Utc::now() - Duration::minutes(age_minutes);
        invoice
    }

    fn cash(amount: Decimal) -> PaymentDraft {
        PaymentDraft::new(amount, PaymentMethod::Cash)
    }

    #[test]
    fn test_select_skips_paid_invoices() {
        let student = Uuid::new_v4();
        let mut paid = InvoiceRecord::new(invoice_for(student, dec!(50), 1));
        paid.payments.push(cash(dec!(50)).into_payment(paid.invoice.id));
        let open = InvoiceRecord::new(invoice_for(student, dec!(80), 5));

        let records = vec![paid, open.clone()];
        let selected = select_target(&records, PaymentTarget::Student(student)).unwrap();
        assert_eq!(selected.invoice.id, open.invoice.id);
    }

    #[test]
    fn test_select_ignores_other_students() {
        let student = Uuid::new_v4();
        let records = vec![InvoiceRecord::new(invoice_for(Uuid::new_v4(), dec!(10), 0))];
        let err = select_target(&records, PaymentTarget::Student(student)).unwrap_err();
        assert_eq!(err.error_code(), "NO_OUTSTANDING_INVOICE");
    }

    #[test]
    fn test_select_explicit_invoice() {
        let mut record = InvoiceRecord::new(invoice_for(Uuid::new_v4(), dec!(10), 0));
        let id = record.invoice.id;

        let records = vec![record.clone()];
        assert!(select_target(&records, PaymentTarget::Invoice(id)).is_ok());

        let missing = select_target(&records, PaymentTarget::Invoice(Uuid::new_v4())).unwrap_err();
        assert_eq!(missing.error_code(), "ENTITY_NOT_FOUND");

        record.payments.push(cash(dec!(10)).into_payment(id));
        let records = vec![record];
        let paid = select_target(&records, PaymentTarget::Invoice(id)).unwrap_err();
        assert_eq!(paid.error_code(), "INVOICE_ALREADY_PAID");
    }

    #[test]
    fn test_apply_rejects_overpayment() {
        let mut record = InvoiceRecord::new(invoice_for(Uuid::new_v4(), dec!(100), 0));
        apply_payment(&mut record, cash(dec!(40)), LedgerConfig::default()).unwrap();

        let err = apply_payment(&mut record, cash(dec!(70)), LedgerConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "OVERPAYMENT");
        assert_eq!(record.payments.len(), 1);

        let allow = LedgerConfig {
            allow_overpayment: true,
        };
        apply_payment(&mut record, cash(dec!(70)), allow).unwrap();
        assert_eq!(record.amount_paid(), dec!(110));
    }

    #[tokio::test]
    async fn test_recorder_pays_newest_unpaid_invoice() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let student = Uuid::new_v4();
        let older = store
            .create_invoice(invoice_for(student, dec!(100), 60))
            .await
            .unwrap();
        let newer = store
            .create_invoice(invoice_for(student, dec!(30), 1))
            .await
            .unwrap();

        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let recorder =
            PaymentRecorder::new(store.clone(), LedgerConfig::default()).with_event_bus(Some(bus));

        let payment = recorder
            .record_for_student(student, cash(dec!(30)))
            .await
            .unwrap();
        assert_eq!(payment.invoice_id, newer.id);

        let payment = recorder
            .record_for_student(student, cash(dec!(25)))
            .await
            .unwrap();
        assert_eq!(payment.invoice_id, older.id);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event.name(), "payment_recorded");
    }

    #[tokio::test]
    async fn test_recorder_without_invoices() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let recorder = PaymentRecorder::new(store.clone(), LedgerConfig::default());

        let err = recorder
            .record_for_student(Uuid::new_v4(), cash(dec!(5)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SchoolError::Ledger(LedgerError::NoOutstandingInvoice { .. })
        ));
        assert!(store.list_invoices(None).await.unwrap().is_empty());
    }
}
