//! Resolves the `X-User-Id` header against the user directory

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::core::auth::{AuthContext, AuthProvider, USER_ID_HEADER};
use crate::core::error::{RequestError, SchoolError};
use crate::core::DataService;
use crate::entities::user::User;

/// Auth provider backed by the user directory.
///
/// No header → anonymous. A malformed id, an unknown user or an inactive
/// account is rejected with 401.
pub struct DirectoryAuthProvider {
    users: Arc<dyn DataService<User>>,
}

impl DirectoryAuthProvider {
    pub fn new(users: Arc<dyn DataService<User>>) -> Self {
        Self { users }
    }
}

fn unauthorized(message: impl Into<String>) -> SchoolError {
    RequestError::Unauthorized {
        message: message.into(),
    }
    .into()
}

#[async_trait]
impl AuthProvider for DirectoryAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, SchoolError> {
        let Some(raw) = headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|s| uuid::Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| unauthorized(format!("{} is not a valid user id", USER_ID_HEADER)))?;

        let user = self
            .users
            .get(&user_id)
            .await?
            .ok_or_else(|| unauthorized(format!("unknown user '{}'", user_id)))?;

        if !user.is_active() {
            tracing::debug!(%user_id, "inactive user rejected");
            return Err(unauthorized(format!("user '{}' is inactive", user_id)));
        }

        Ok(AuthContext::User {
            user_id,
            role: user.role,
        })
    }
}
