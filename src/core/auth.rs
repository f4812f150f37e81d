//! Caller identity and authorization policies
//!
//! Credentials are verified upstream; requests reach this service carrying an
//! `X-User-Id` header that an [`AuthProvider`] turns into an [`AuthContext`].
//! Handlers then check an [`AuthPolicy`] against the role capability table.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::capability::{Capabilities, Capability, CapabilityTable};
use crate::core::error::{RequestError, SchoolError, SchoolResult};

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Role of a user in the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Accountant,
    Clerk,
    Librarian,
    Staff,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Teacher,
        Role::Student,
        Role::Accountant,
        Role::Clerk,
        Role::Librarian,
        Role::Staff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Accountant => "accountant",
            Role::Clerk => "clerk",
            Role::Librarian => "librarian",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown role '{}'", wanted))
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// A known, active user
    User { user_id: Uuid, role: Role },

    /// No identity header was sent
    Anonymous,
}

impl AuthContext {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthContext::User { role, .. } => Some(*role),
            AuthContext::Anonymous => None,
        }
    }

    pub fn is_self(&self, id: Uuid) -> bool {
        self.user_id() == Some(id)
    }

    /// Identity of an authenticated caller, or 401
    pub fn require_user(&self) -> SchoolResult<(Uuid, Role)> {
        match self {
            AuthContext::User { user_id, role } => Ok((*user_id, *role)),
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: format!("missing {} header", USER_ID_HEADER),
            }
            .into()),
        }
    }

    /// Capabilities of an authenticated caller, or 401
    pub fn capabilities<'a>(&self, table: &'a CapabilityTable) -> SchoolResult<&'a Capabilities> {
        let (_, role) = self.require_user()?;
        Ok(table.for_role(role))
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// Caller's role must grant this capability
    Allows(Capability),

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext, table: &CapabilityTable) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::Allows(capability) => match context {
                AuthContext::User { role, .. } => table.allows(*role, *capability),
                AuthContext::Anonymous => false,
            },

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context, table)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context, table)),
        }
    }

    /// Like [`check`](Self::check) but yields the HTTP-facing error:
    /// 401 for anonymous callers, 403 for callers lacking the permission
    pub fn enforce(&self, context: &AuthContext, table: &CapabilityTable) -> SchoolResult<()> {
        if self.check(context, table) {
            return Ok(());
        }
        match context {
            AuthContext::Anonymous => Err(SchoolError::Request(RequestError::Unauthorized {
                message: format!("missing {} header", USER_ID_HEADER),
            })),
            AuthContext::User { role, .. } => Err(SchoolError::forbidden(format!(
                "role '{}' is not allowed to perform this action",
                role
            ))),
        }
    }
}

/// Resolves the caller of a request
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, SchoolError>;
}

/// Provider that treats every request as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext, SchoolError> {
        Ok(AuthContext::Anonymous)
    }
}
