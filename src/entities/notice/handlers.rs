//! Notice board HTTP handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use super::model::{AuthorRef, Notice, NoticePatch, NoticeView, sort_for_board};
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::capability::Capability;
use crate::core::error::{SchoolError, SchoolResult};
use crate::core::events::DomainEvent;
use crate::core::validation::parse_uuid;
use crate::core::{Caller, JsonBody};
use crate::server::AppState;

async fn author_refs(state: &AppState) -> SchoolResult<HashMap<Uuid, AuthorRef>> {
    Ok(state
        .users
        .list()
        .await?
        .into_iter()
        .map(|u| {
            (
                u.id,
                AuthorRef {
                    name: u.name,
                    avatar: u.avatar,
                },
            )
        })
        .collect())
}

async fn view(state: &AppState, notice: Notice) -> SchoolResult<NoticeView> {
    let author = state.users.get(&notice.author_id).await?.map(|u| AuthorRef {
        name: u.name,
        avatar: u.avatar,
    });
    Ok(NoticeView { notice, author })
}

/// Load a notice the caller may edit: its author or a moderator
async fn editable_notice(state: &AppState, ctx: &AuthContext, raw_id: &str) -> SchoolResult<Notice> {
    let id = parse_uuid(raw_id)?;
    let (user_id, _) = ctx.require_user()?;

    let notice = state
        .notices
        .get(&id)
        .await?
        .ok_or_else(|| SchoolError::not_found("notice", id))?;

    let moderator = AuthPolicy::Allows(Capability::ModerateNotices).check(ctx, &state.capabilities);
    if notice.author_id != user_id && !moderator {
        return Err(SchoolError::forbidden("only the author or a moderator may change this notice"));
    }
    Ok(notice)
}

/// `GET /notices`: the caller's audience tiers, pinned first then newest
pub async fn list_notices(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> SchoolResult<Json<Vec<NoticeView>>> {
    let caps = state.capabilities_of(&ctx)?;

    let mut notices: Vec<Notice> = state
        .notices
        .list()
        .await?
        .into_iter()
        .filter(|n| caps.sees_audience(n.audience))
        .collect();
    sort_for_board(&mut notices);

    let authors = author_refs(&state).await?;
    let views = notices
        .into_iter()
        .map(|notice| NoticeView {
            author: authors.get(&notice.author_id).cloned(),
            notice,
        })
        .collect();
    Ok(Json(views))
}

/// `POST /notices`
pub async fn create_notice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<(StatusCode, Json<NoticeView>)> {
    state.authorize(&ctx, AuthPolicy::Allows(Capability::AuthorNotices))?;
    let (author_id, _) = ctx.require_user()?;

    let notice = state
        .notices
        .create(Notice::from_payload(&payload, author_id)?)
        .await?;

    tracing::info!(notice_id = %notice.id, audience = notice.audience.as_str(), "notice published");
    state.publish(DomainEvent::NoticePublished {
        notice_id: notice.id,
        author_id,
    });
    Ok((StatusCode::CREATED, Json(view(&state, notice).await?)))
}

/// `PUT /notices/{id}`: partial update
pub async fn update_notice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> SchoolResult<Json<NoticeView>> {
    let mut notice = editable_notice(&state, &ctx, &id).await?;
    NoticePatch::from_payload(&payload)?.apply(&mut notice);

    let notice = state.notices.update(&notice.id, notice.clone()).await?;
    state.publish(DomainEvent::NoticeUpdated {
        notice_id: notice.id,
    });
    Ok(Json(view(&state, notice).await?))
}

/// `DELETE /notices/{id}`
pub async fn delete_notice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> SchoolResult<Json<Value>> {
    let notice = editable_notice(&state, &ctx, &id).await?;
    state.notices.delete(&notice.id).await?;

    tracing::info!(notice_id = %notice.id, "notice deleted");
    state.publish(DomainEvent::NoticeDeleted {
        notice_id: notice.id,
    });
    Ok(Json(json!({ "message": "Notice removed" })))
}
