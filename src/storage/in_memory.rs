//! In-memory storage for development, tests and demos
//!
//! Collections are insertion-ordered [`IndexMap`]s behind `RwLock`s. A
//! poisoned lock surfaces as [`StorageError::LockPoisoned`].

use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::core::error::{EntityError, SchoolError, SchoolResult, StorageError};
use crate::core::{DataService, Entity};
use crate::entities::invoice::{Invoice, InvoiceRecord};
use crate::entities::payment::{Payment, PaymentDraft};
use crate::ledger::recorder::{PaymentTarget, admit_payment, apply_payment, select_target};
use crate::ledger::store::LedgerStore;

fn poisoned(resource: &str) -> SchoolError {
    StorageError::LockPoisoned {
        resource: resource.to_string(),
    }
    .into()
}

fn already_exists(entity_type: &str, id: Uuid) -> SchoolError {
    EntityError::AlreadyExists {
        entity_type: entity_type.to_string(),
        field: "id".to_string(),
        value: id.to_string(),
    }
    .into()
}

/// Generic in-memory record service
pub struct InMemoryDataService<T: Entity> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
    _marker: PhantomData<T>,
}

impl<T: Entity> Clone for InMemoryDataService<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> InMemoryDataService<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            _marker: PhantomData,
        }
    }

    fn read(&self) -> SchoolResult<RwLockReadGuard<'_, IndexMap<Uuid, T>>> {
        self.records.read().map_err(|_| poisoned(T::resource_name()))
    }

    fn write(&self) -> SchoolResult<RwLockWriteGuard<'_, IndexMap<Uuid, T>>> {
        self.records.write().map_err(|_| poisoned(T::resource_name()))
    }
}

impl<T: Entity> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, entity: T) -> SchoolResult<T> {
        let mut records = self.write()?;
        let id = entity.id();
        if records.contains_key(&id) {
            return Err(already_exists(T::resource_name_singular(), id));
        }
        records.insert(id, entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> SchoolResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn list(&self) -> SchoolResult<Vec<T>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, entity: T) -> SchoolResult<T> {
        let mut records = self.write()?;
        let slot = records
            .get_mut(id)
            .ok_or_else(|| SchoolError::not_found(T::resource_name_singular(), *id))?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> SchoolResult<Option<T>> {
        Ok(self.write()?.shift_remove(id))
    }

    async fn search(&self, field: &str, value: &str) -> SchoolResult<Vec<T>> {
        Ok(self
            .read()?
            .values()
            .filter(|r| {
                r.field_value(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(value))
            })
            .cloned()
            .collect())
    }
}

/// In-memory ledger: every invoice with its payments under one lock
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    invoices: Arc<RwLock<IndexMap<Uuid, InvoiceRecord>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing order: newest first, later insertions first on equal timestamps
    fn ordered<'a>(
        invoices: &'a IndexMap<Uuid, InvoiceRecord>,
        student_id: Option<&Uuid>,
    ) -> Vec<&'a InvoiceRecord> {
        let mut records: Vec<&InvoiceRecord> = invoices
            .values()
            .rev()
            .filter(|r| student_id.is_none_or(|s| r.invoice.student_id == *s))
            .collect();
        records.sort_by(|a, b| b.invoice.created_at.cmp(&a.invoice.created_at));
        records
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_invoice(&self, invoice: Invoice) -> SchoolResult<Invoice> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned("invoices"))?;
        if invoices.contains_key(&invoice.id) {
            return Err(already_exists("invoice", invoice.id));
        }
        invoices.insert(invoice.id, InvoiceRecord::new(invoice.clone()));
        Ok(invoice)
    }

    async fn get_invoice(&self, id: &Uuid) -> SchoolResult<Option<InvoiceRecord>> {
        let invoices = self.invoices.read().map_err(|_| poisoned("invoices"))?;
        Ok(invoices.get(id).cloned())
    }

    async fn list_invoices(&self, student_id: Option<&Uuid>) -> SchoolResult<Vec<InvoiceRecord>> {
        let invoices = self.invoices.read().map_err(|_| poisoned("invoices"))?;
        Ok(Self::ordered(&invoices, student_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn record_payment(
        &self,
        target: PaymentTarget,
        draft: PaymentDraft,
        policy: LedgerConfig,
    ) -> SchoolResult<Payment> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned("invoices"))?;

        let invoice_id = match target {
            PaymentTarget::Student(student_id) => {
                let ordered = Self::ordered(&invoices, Some(&student_id));
                select_target(ordered, target)?.invoice.id
            }
            PaymentTarget::Invoice(invoice_id) => {
                select_target(invoices.get(&invoice_id), target)?.invoice.id
            }
        };

        let record = invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| SchoolError::not_found("invoice", invoice_id))?;
        apply_payment(record, draft, policy)
    }

    async fn import_payment(
        &self,
        payment: Payment,
        policy: LedgerConfig,
    ) -> SchoolResult<Payment> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned("invoices"))?;
        let record = invoices
            .get_mut(&payment.invoice_id)
            .ok_or_else(|| SchoolError::not_found("invoice", payment.invoice_id))?;
        if record.payments.iter().any(|p| p.id == payment.id) {
            return Err(already_exists("payment", payment.id));
        }
        admit_payment(record, payment.amount_paid, policy)?;
        record.payments.push(payment.clone());
        Ok(payment)
    }
}
