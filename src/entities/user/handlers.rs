//! User directory HTTP handlers

use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{NewUser, User, UserFilter, UserPatch};
use crate::core::auth::{AuthPolicy, Role};
use crate::core::capability::Capability;
use crate::core::error::{EntityError, SchoolError, SchoolResult};
use crate::core::events::DomainEvent;
use crate::core::validation::parse_uuid;
use crate::core::{Caller, JsonBody};
use crate::entities::class::Enrollment;
use crate::server::AppState;

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> SchoolResult<()> {
    let taken = state
        .users
        .search("email", email)
        .await?
        .into_iter()
        .any(|u| Some(u.id) != except);
    if taken {
        return Err(EntityError::AlreadyExists {
            entity_type: "user".to_string(),
            field: "email".to_string(),
            value: email.to_string(),
        }
        .into());
    }
    Ok(())
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(filter): Query<UserFilter>,
) -> SchoolResult<Json<Vec<User>>> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::ReadUsers))?;

    let class_members: Option<HashSet<Uuid>> = match filter.class_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let class_id = parse_uuid(raw)?;
            let members = state
                .enrollments
                .search("classId", &class_id.to_string())
                .await?
                .into_iter()
                .map(|e| e.student_id)
                .collect();
            Some(members)
        }
    };

    let users = state
        .users
        .list()
        .await?
        .into_iter()
        .filter(|u| filter.matches(u))
        .filter(|u| class_members.as_ref().is_none_or(|m| m.contains(&u.id)))
        .collect();
    Ok(Json(users))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<User>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::ManageUsers))?;

    let new_user = NewUser::from_payload(&payload)?;
    ensure_email_free(&state, &new_user.email, None).await?;

    let enroll_in = match (new_user.role, new_user.class_id) {
        (Role::Student, Some(class_id)) => {
            state
                .classes
                .get(&class_id)
                .await?
                .ok_or_else(|| SchoolError::not_found("class", class_id))?;
            Some(class_id)
        }
        _ => None,
    };

    let user = state.users.create(new_user.into_user()).await?;
    if let Some(class_id) = enroll_in {
        state
            .enrollments
            .create(Enrollment::new(user.id, class_id))
            .await?;
    }

    tracing::info!(user_id = %user.id, role = %user.role, "user created");
    state.publish(DomainEvent::UserCreated {
        user_id: user.id,
        role: user.role.to_string(),
    });
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`: directory readers or the user themselves
pub async fn get_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> SchoolResult<Json<User>> {
    let id = parse_uuid(&id)?;
    ctx.require_user()?;
    if !ctx.is_self(id) {
        state.authorize(&ctx, AuthPolicy::Allows(Capability::ReadUsers))?;
    }
    Ok(Json(state.require_user(id).await?))
}

/// `PUT /users/{id}`: administrators, or the user for their own profile
pub async fn update_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<Json<User>> {
    let id = parse_uuid(&id)?;
    let can_manage = AuthPolicy::Allows(Capability::ManageUsers).check(&ctx, &state.capabilities);
    if !can_manage {
        ctx.require_user()?;
        if !ctx.is_self(id) {
            return Err(SchoolError::forbidden(
                "You are not authorized to update this user",
            ));
        }
    }

    let mut user = state.require_user(id).await?;
    let patch = UserPatch::from_payload(&payload)?;
    if !can_manage && patch.touches_privileged_fields(&user) {
        return Err(SchoolError::forbidden("only administrators may change role or status"));
    }
    if let Some(email) = &patch.email {
        ensure_email_free(&state, email, Some(id)).await?;
    }

    patch.apply(&mut user);
    let user = state.users.update(&id, user).await?;
    tracing::info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

/// `DELETE /users/{id}`: also drops the user's class enrollments
pub async fn delete_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> SchoolResult<Json<Value>> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::ManageUsers))?;
    let id = parse_uuid(&id)?;

    state
        .users
        .delete(&id)
        .await?
        .ok_or_else(|| SchoolError::not_found("user", id))?;

    for enrollment in state.enrollments.search("studentId", &id.to_string()).await? {
        state.enrollments.delete(&enrollment.id).await?;
    }

    tracing::info!(user_id = %id, "user deleted");
    state.publish(DomainEvent::UserDeleted { user_id: id });
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
