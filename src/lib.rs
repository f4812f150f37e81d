//! # Eduverse
//!
//! School-office REST service: users, classes, a notice board, and a fee
//! ledger of invoices and payments.
//!
//! ## Layout
//!
//! - [`ledger`]: balance/status reduction and payment recording
//! - [`entities`]: users, classes, notices, invoices and payments with their routes
//! - [`server`]: shared state, route registry and the Axum router
//! - [`storage`]: in-memory stores
//! - [`seed`]: YAML demo data applied at startup
//! - [`config`]: YAML configuration, including per-role capabilities
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eduverse::prelude::*;
//!
//! let config = AppConfig::from_yaml_file("demos/config.yaml")?;
//! let app = ServerBuilder::new()
//!     .with_config(config)
//!     .with_event_bus(1024)
//!     .build()?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod ledger;
pub mod seed;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Audience, AuthContext, AuthPolicy, AuthProvider, Capabilities, Capability,
        CapabilityTable, DataService, DomainEvent, Entity, EventBus, InvoiceScope, NoAuthProvider,
        Role, SchoolError, SchoolResult, USER_ID_HEADER,
    };

    // === Resources ===
    pub use crate::entities::class::{Class, Enrollment};
    pub use crate::entities::invoice::{Invoice, InvoiceRecord, InvoiceStatus, InvoiceView};
    pub use crate::entities::notice::{Notice, Priority};
    pub use crate::entities::payment::{Payment, PaymentDraft, PaymentMethod};
    pub use crate::entities::user::{User, UserStatus};

    // === Ledger ===
    pub use crate::ledger::{FeeStatus, LedgerStore, LedgerSummary, PaymentRecorder, PaymentTarget};

    // === Storage ===
    pub use crate::storage::{InMemoryDataService, InMemoryLedgerStore};

    // === Config & seed ===
    pub use crate::config::AppConfig;
    pub use crate::seed::{SeedFile, Seeder};

    // === Server ===
    pub use crate::server::{AppState, EntityDescriptor, ServerBuilder, serve};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use uuid::Uuid;
}
