//! Class HTTP handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use super::model::{Class, ClassView};
use crate::core::auth::{AuthPolicy, Role};
use crate::core::capability::Capability;
use crate::core::error::{SchoolError, SchoolResult};
use crate::core::{Caller, JsonBody};
use crate::server::AppState;

/// `GET /classes`: every class with its enrolled student count
pub async fn list_classes(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> SchoolResult<Json<Vec<ClassView>>> {
    state.authorize(&ctx, AuthPolicy::Authenticated)?;

    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for enrollment in state.enrollments.list().await? {
        *counts.entry(enrollment.class_id).or_default() += 1;
    }

    let views = state
        .classes
        .list()
        .await?
        .into_iter()
        .map(|class| ClassView {
            student_count: counts.get(&class.id).copied().unwrap_or(0),
            class,
        })
        .collect();
    Ok(Json(views))
}

/// `POST /classes`
pub async fn create_class(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<ClassView>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::ManageClasses))?;

    let class = Class::from_payload(&payload)?;
    if let Some(teacher_id) = class.teacher_id {
        match state.users.get(&teacher_id).await? {
            Some(user) if user.role == Role::Teacher => {}
            _ => return Err(SchoolError::not_found("teacher", teacher_id)),
        }
    }

    let class = state.classes.create(class).await?;
    tracing::info!(class_id = %class.id, name = %class.name, "class created");
    Ok((
        StatusCode::CREATED,
        Json(ClassView {
            class,
            student_count: 0,
        }),
    ))
}
