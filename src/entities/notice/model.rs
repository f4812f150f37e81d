//! Notice board model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::capability::Audience;
use crate::core::error::{SchoolResult, ValidationError};
use crate::core::validation::{optional_bool, optional_str, require_fields, required_str};
use crate::core::Entity;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

fn parse_audience(raw: &str) -> SchoolResult<Audience> {
    Audience::parse(raw).ok_or_else(|| {
        ValidationError::field("audience", "must be one of Everyone, Students, Teachers").into()
    })
}

fn parse_priority(raw: &str) -> SchoolResult<Priority> {
    Priority::parse(raw)
        .ok_or_else(|| ValidationError::field("priority", "must be one of High, Medium, Low").into())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub audience: Audience,
    pub priority: Priority,
    pub is_pinned: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notice {
    /// Validate a `POST /notices` body and stamp it with its author
    pub fn from_payload(payload: &Value, author_id: Uuid) -> SchoolResult<Self> {
        require_fields(payload, &["title", "content", "audience", "priority"])?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: required_str(payload, "title")?,
            content: required_str(payload, "content")?,
            category: optional_str(payload, "category")?
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            audience: parse_audience(&required_str(payload, "audience")?)?,
            priority: parse_priority(&required_str(payload, "priority")?)?,
            is_pinned: optional_bool(payload, "isPinned")?.unwrap_or(false),
            author_id,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Notice {
    fn resource_name() -> &'static str {
        "notices"
    }

    fn resource_name_singular() -> &'static str {
        "notice"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "title" => Some(self.title.clone()),
            "category" => Some(self.category.clone()),
            "audience" => Some(self.audience.as_str().to_string()),
            "authorId" => Some(self.author_id.to_string()),
            _ => None,
        }
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub audience: Option<Audience>,
    pub priority: Option<Priority>,
    pub is_pinned: Option<bool>,
}

impl NoticePatch {
    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        Ok(Self {
            title: optional_str(payload, "title")?,
            content: optional_str(payload, "content")?,
            category: optional_str(payload, "category")?,
            audience: optional_str(payload, "audience")?
                .map(|a| parse_audience(&a))
                .transpose()?,
            priority: optional_str(payload, "priority")?
                .map(|p| parse_priority(&p))
                .transpose()?,
            is_pinned: optional_bool(payload, "isPinned")?,
        })
    }

    pub fn apply(self, notice: &mut Notice) {
        if let Some(title) = self.title {
            notice.title = title;
        }
        if let Some(content) = self.content {
            notice.content = content;
        }
        if let Some(category) = self.category {
            notice.category = category;
        }
        if let Some(audience) = self.audience {
            notice.audience = audience;
        }
        if let Some(priority) = self.priority {
            notice.priority = priority;
        }
        if let Some(is_pinned) = self.is_pinned {
            notice.is_pinned = is_pinned;
        }
        notice.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRef {
    pub name: String,
    pub avatar: String,
}

/// Wire shape of a notice
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    #[serde(flatten)]
    pub notice: Notice,
    pub author: Option<AuthorRef>,
}

/// Board order: pinned first, then newest first
pub fn sort_for_board(notices: &mut [Notice]) {
    notices.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
