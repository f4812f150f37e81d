//! Payment model

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{SchoolResult, ValidationError};
use crate::core::validation::{optional_str, require_fields};
use crate::ledger::amount::parse_amount;

/// How the money was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CreditCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cash,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cash => "Cash",
        }
    }

    /// Case-insensitive; also accepts `credit_card` / `bank-transfer` spellings
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL.into_iter().find(|m| {
            m.label()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .eq_ignore_ascii_case(&normalized)
        })
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Money received against one invoice. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated payment that has not been attached to an invoice yet
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

impl PaymentDraft {
    pub fn new(amount: Decimal, method: PaymentMethod) -> Self {
        Self {
            amount,
            method,
            transaction_id: None,
            notes: None,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Build from a request body. The amount may be sent as `amountPaid` or
    /// `amount`, as a number or a numeric string.
    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        let amount_field = if payload.get("amountPaid").is_some_and(|v| !v.is_null()) {
            "amountPaid"
        } else {
            "amount"
        };
        require_fields(payload, &[amount_field, "paymentMethod"])?;

        let amount = parse_amount(amount_field, &payload[amount_field])?;

        let raw_method = payload["paymentMethod"].as_str().unwrap_or_default();
        let method = PaymentMethod::parse(raw_method).ok_or_else(|| {
            ValidationError::field(
                "paymentMethod",
                format!(
                    "'{}' is not one of Credit Card, Bank Transfer, Cash",
                    raw_method
                ),
            )
        })?;

        Ok(Self {
            amount,
            method,
            transaction_id: optional_str(payload, "transactionId")?,
            notes: optional_str(payload, "notes")?,
        })
    }

    pub fn into_payment(self, invoice_id: Uuid) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            invoice_id,
            amount_paid: self.amount,
            payment_method: self.method,
            transaction_id: self.transaction_id,
            notes: self.notes,
            created_at: Utc::now(),
        }
    }
}
