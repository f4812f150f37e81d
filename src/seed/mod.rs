//! Demo data loading
//!
//! A seed file is a YAML document applied once at startup. Records keep the
//! identifiers they declare so that fixtures and client bookmarks stay stable
//! across restarts. Anything that would be rejected over HTTP (unknown class,
//! non-student invoice, bad amount, duplicate id or email) aborts the seed.
//!
//! ```yaml
//! version: 1
//! classes:
//!   - id: 7c0e2f5a-0000-4000-8000-000000000601
//!     name: Class 6
//! users:
//!   - id: 0b8f2c1e-0000-4000-8000-000000000101
//!     name: Emma Wilson
//!     email: emma@school.edu
//!     role: student
//!     classId: 7c0e2f5a-0000-4000-8000-000000000601
//! invoices:
//!   - id: 5d1c7a90-0000-4000-8000-000000000901
//!     studentId: 0b8f2c1e-0000-4000-8000-000000000101
//!     description: Term 1 tuition
//!     amount: "1200.00"
//!     dueDate: 2024-01-15
//!     payments:
//!       - amountPaid: "500"
//!         paymentMethod: Bank Transfer
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::core::auth::Role;
use crate::core::capability::Audience;
use crate::core::error::{EntityError, SchoolError, SchoolResult};
use crate::entities::class::{Class, Enrollment};
use crate::entities::invoice::Invoice;
use crate::entities::notice::{Notice, Priority};
use crate::entities::notice::model::DEFAULT_CATEGORY;
use crate::entities::payment::{Payment, PaymentMethod};
use crate::entities::user::{User, UserStatus};
use crate::ledger::amount::parse_amount;
use crate::server::AppState;

/// Seed document format version understood by this build
pub const SEED_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    pub version: Option<u32>,
    pub classes: Vec<SeedClass>,
    pub users: Vec<SeedUser>,
    pub invoices: Vec<SeedInvoice>,
    pub notices: Vec<SeedNotice>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedClass {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Enroll a student into this class
    #[serde(default)]
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedInvoice {
    pub id: Uuid,
    pub student_id: Uuid,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payments: Vec<SeedPayment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedPayment {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedNotice {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    pub audience: Audience,
    pub priority: Priority,
    #[serde(default)]
    pub is_pinned: bool,
    pub author_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Counts of what a seed run inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub classes: usize,
    pub enrollments: usize,
    pub invoices: usize,
    pub payments: usize,
    pub notices: usize,
}

impl SeedFile {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let seed: Self = serde_yaml::from_str(yaml)?;
        if let Some(version) = seed.version {
            anyhow::ensure!(
                version == SEED_VERSION,
                "unsupported seed version {} (expected {})",
                version,
                SEED_VERSION
            );
        }
        Ok(seed)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse seed file {}", path.display()))
    }
}

/// Applies a [`SeedFile`] to the application state
pub struct Seeder<'a> {
    state: &'a AppState,
}

impl<'a> Seeder<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Insert classes, users (with enrollments), invoices with their payments,
    /// then notices. Stops at the first rejected record.
    pub async fn apply(&self, seed: &SeedFile) -> SchoolResult<SeedReport> {
        let mut report = SeedReport::default();

        for class in &seed.classes {
            self.state
                .classes
                .create(Class {
                    id: class.id,
                    ..Class::new(&class.name, class.description.clone(), class.teacher_id)
                })
                .await?;
            report.classes += 1;
        }

        for user in &seed.users {
            self.seed_user(user, &mut report).await?;
        }

        // Teachers may be declared after their classes
        for class in &seed.classes {
            if let Some(teacher_id) = class.teacher_id {
                match self.state.users.get(&teacher_id).await? {
                    Some(user) if user.role == Role::Teacher => {}
                    _ => return Err(SchoolError::not_found("teacher", teacher_id)),
                }
            }
        }

        for invoice in &seed.invoices {
            self.seed_invoice(invoice, &mut report).await?;
        }

        for notice in &seed.notices {
            self.state.require_user(notice.author_id).await?;
            let created_at = notice.created_at.unwrap_or_else(Utc::now);
            self.state
                .notices
                .create(Notice {
                    id: notice.id.unwrap_or_else(Uuid::new_v4),
                    title: notice.title.clone(),
                    content: notice.content.clone(),
                    category: notice
                        .category
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                    audience: notice.audience,
                    priority: notice.priority,
                    is_pinned: notice.is_pinned,
                    author_id: notice.author_id,
                    created_at,
                    updated_at: created_at,
                })
                .await?;
            report.notices += 1;
        }

        tracing::info!(
            users = report.users,
            classes = report.classes,
            invoices = report.invoices,
            payments = report.payments,
            notices = report.notices,
            "seed applied"
        );
        Ok(report)
    }

    async fn seed_user(&self, seed: &SeedUser, report: &mut SeedReport) -> SchoolResult<()> {
        let email = seed.email.trim().to_lowercase();
        if !self.state.users.search("email", &email).await?.is_empty() {
            return Err(EntityError::AlreadyExists {
                entity_type: "user".to_string(),
                field: "email".to_string(),
                value: email,
            }
            .into());
        }

        let mut user = User::new(&seed.name, &email, seed.role);
        user.id = seed.id;
        user.status = seed.status;
        if let Some(avatar) = &seed.avatar {
            user.avatar = avatar.clone();
        }
        let user = self.state.users.create(user).await?;
        report.users += 1;

        if let Some(class_id) = seed.class_id {
            if user.role != Role::Student {
                return Err(SchoolError::not_found("student", user.id));
            }
            if self.state.classes.get(&class_id).await?.is_none() {
                return Err(SchoolError::not_found("class", class_id));
            }
            self.state
                .enrollments
                .create(Enrollment::new(user.id, class_id))
                .await?;
            report.enrollments += 1;
        }
        Ok(())
    }

    async fn seed_invoice(&self, seed: &SeedInvoice, report: &mut SeedReport) -> SchoolResult<()> {
        self.state.require_student(seed.student_id).await?;
        let amount = checked_amount("amount", seed.amount)?;

        let mut invoice = Invoice::new(seed.student_id, &seed.description, amount, seed.due_date);
        invoice.id = seed.id;
        if let Some(created_at) = seed.created_at {
            invoice.created_at = created_at;
        }
        let invoice = self.state.ledger.create_invoice(invoice).await?;
        report.invoices += 1;

        for payment in &seed.payments {
            let payment = Payment {
                id: payment.id.unwrap_or_else(Uuid::new_v4),
                invoice_id: invoice.id,
                amount_paid: checked_amount("amountPaid", payment.amount_paid)?,
                payment_method: payment.payment_method,
                transaction_id: payment.transaction_id.clone(),
                notes: payment.notes.clone(),
                created_at: payment.created_at.unwrap_or_else(Utc::now),
            };
            self.state
                .ledger
                .import_payment(payment, self.state.config.ledger)
                .await?;
            report.payments += 1;
        }
        Ok(())
    }
}

/// Seeded amounts obey the same rules as amounts sent over HTTP
fn checked_amount(field: &str, amount: Decimal) -> SchoolResult<Decimal> {
    parse_amount(field, &Value::String(amount.to_string()))
}
