//! Core traits and types shared by every resource

pub mod auth;
pub mod capability;
pub mod entity;
pub mod error;
pub mod events;
pub mod extractors;
pub mod service;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider, Role, USER_ID_HEADER};
pub use capability::{Audience, Capabilities, Capability, CapabilityTable, InvoiceScope};
pub use entity::Entity;
pub use error::{SchoolError, SchoolResult};
pub use events::{DomainEvent, EventBus, EventEnvelope};
pub use extractors::{Caller, JsonBody};
pub use service::DataService;
