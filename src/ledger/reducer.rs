//! Ledger reducer: folds a student's invoices into one balance and status

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::error::{LedgerError, SchoolResult};
use crate::entities::invoice::{InvoiceRecord, InvoiceStatus};
use crate::ledger::amount::checked_total;

/// Fee status of a student as shown on dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeeStatus {
    #[serde(rename = "No Dues")]
    NoDues,
    Paid,
    Pending,
    Partial,
    Overdue,
}

impl FeeStatus {
    pub const ALL: [FeeStatus; 5] = [
        FeeStatus::NoDues,
        FeeStatus::Paid,
        FeeStatus::Pending,
        FeeStatus::Partial,
        FeeStatus::Overdue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeeStatus::NoDues => "No Dues",
            FeeStatus::Paid => "Paid",
            FeeStatus::Pending => "Pending",
            FeeStatus::Partial => "Partial",
            FeeStatus::Overdue => "Overdue",
        }
    }

    /// Case-insensitive, ignoring spaces and underscores (`no_dues`, `NoDues`)
    pub fn parse(raw: &str) -> Option<Self> {
        let squash = |s: &str| {
            s.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = squash(raw);
        Self::ALL.into_iter().find(|s| squash(s.label()) == wanted)
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived per-student ledger entry; computed on every read, never stored
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_due: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub status: FeeStatus,
}

impl LedgerSummary {
    /// Reduce a student's invoices as of `now`.
    ///
    /// An unpaid invoice becomes overdue at 00:00 UTC on its due date.
    pub fn from_records(records: &[InvoiceRecord], now: DateTime<Utc>) -> SchoolResult<Self> {
        let total_due = checked_total(records.iter().map(|r| r.invoice.amount))?;
        let total_paid = checked_total(
            records
                .iter()
                .flat_map(|r| r.payments.iter().map(|p| p.amount_paid)),
        )?;
        let balance = total_due
            .checked_sub(total_paid)
            .ok_or(LedgerError::AmountOverflow)?;

        let status = if balance > Decimal::ZERO {
            let overdue = records.iter().any(|r| {
                r.status() != InvoiceStatus::Paid
                    && r.invoice.due_date.and_time(NaiveTime::MIN).and_utc() < now
            });
            if overdue {
                FeeStatus::Overdue
            } else if total_paid > Decimal::ZERO {
                FeeStatus::Partial
            } else {
                FeeStatus::Pending
            }
        } else if total_due > Decimal::ZERO {
            FeeStatus::Paid
        } else {
            FeeStatus::NoDues
        };

        Ok(Self {
            total_due: total_due.round_dp(2),
            total_paid: total_paid.round_dp(2),
            balance: balance.round_dp(2),
            status,
        })
    }
}
