//! Server host: the shared state every handler works against
//!
//! [`AppState`] bundles the storage services, the capability table, the auth
//! provider and the optional event bus. It is cheap to clone (everything is
//! behind `Arc`) and is handed to each [`EntityDescriptor`](super::EntityDescriptor)
//! when routes are built.

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::core::auth::{AuthContext, AuthPolicy, AuthProvider, Role};
use crate::core::capability::{Capabilities, CapabilityTable};
use crate::core::error::{SchoolError, SchoolResult};
use crate::core::events::{DomainEvent, EventBus};
use crate::core::DataService;
use crate::entities::class::{Class, Enrollment};
use crate::entities::notice::Notice;
use crate::entities::user::User;
use crate::ledger::recorder::PaymentRecorder;
use crate::ledger::store::LedgerStore;
use crate::server::entity_registry::EntityRegistry;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn DataService<User>>,
    pub classes: Arc<dyn DataService<Class>>,
    pub enrollments: Arc<dyn DataService<Enrollment>>,
    pub notices: Arc<dyn DataService<Notice>>,
    pub ledger: Arc<dyn LedgerStore>,
    pub recorder: PaymentRecorder,
    pub capabilities: Arc<CapabilityTable>,
    pub auth: Arc<dyn AuthProvider>,
    pub event_bus: Option<Arc<EventBus>>,
}

impl FromRef<AppState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Fire-and-forget publish; no-op without a bus
    pub fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// 401 for anonymous callers, 403 when the policy does not hold
    pub fn authorize(&self, ctx: &AuthContext, policy: AuthPolicy) -> SchoolResult<()> {
        policy.enforce(ctx, &self.capabilities)
    }

    /// Capabilities of an authenticated caller
    pub fn capabilities_of(&self, ctx: &AuthContext) -> SchoolResult<&Capabilities> {
        ctx.capabilities(&self.capabilities)
    }

    pub async fn require_user(&self, id: Uuid) -> SchoolResult<User> {
        self.users
            .get(&id)
            .await?
            .ok_or_else(|| SchoolError::not_found("user", id))
    }

    /// The user with this id, provided they are a student
    pub async fn require_student(&self, id: Uuid) -> SchoolResult<User> {
        match self.users.get(&id).await? {
            Some(user) if user.role == Role::Student => Ok(user),
            _ => Err(SchoolError::not_found("student", id)),
        }
    }
}

/// Host context: state plus the registered route descriptors
pub struct ServerHost {
    pub state: AppState,
    pub entity_registry: EntityRegistry,
    /// Extra routers merged after the resource routes
    pub custom_routes: Vec<Router>,
}

impl ServerHost {
    pub fn new(state: AppState, entity_registry: EntityRegistry) -> Self {
        Self {
            state,
            entity_registry,
            custom_routes: Vec::new(),
        }
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.state.event_bus.as_ref()
    }
}
