//! User directory model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::auth::Role;
use crate::core::error::{SchoolResult, ValidationError};
use crate::core::validation::{is_valid_email, optional_str, optional_uuid, require_fields};
use crate::core::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }
}

/// A person known to the school office. Credentials live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: &str, role: Role) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            avatar: default_avatar(&name),
            name,
            email: email.trim().to_lowercase(),
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for User {
    fn resource_name() -> &'static str {
        "users"
    }

    fn resource_name_singular() -> &'static str {
        "user"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "role" => Some(self.role.to_string()),
            "status" => Some(format!("{:?}", self.status).to_lowercase()),
            _ => None,
        }
    }
}

/// Generated avatar for users that did not upload one
pub fn default_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random&color=fff",
        encode_uri_component(name)
    )
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

fn parse_role(raw: &str) -> SchoolResult<Role> {
    raw.parse::<Role>()
        .map_err(|_| ValidationError::field("role", "Invalid user role specified.").into())
}

/// Validated `POST /users` body
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub class_id: Option<Uuid>,
}

impl NewUser {
    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        require_fields(payload, &["name", "email", "role"])?;

        let name = optional_str(payload, "name")?.unwrap_or_default();
        let email = optional_str(payload, "email")?
            .unwrap_or_default()
            .to_lowercase();
        if !is_valid_email(&email) {
            return Err(ValidationError::field("email", format!("'{}' is not a valid email", email)).into());
        }
        let role = parse_role(&optional_str(payload, "role")?.unwrap_or_default())?;

        Ok(Self {
            name,
            email,
            role,
            class_id: optional_uuid(payload, "classId")?,
        })
    }

    pub fn into_user(self) -> User {
        User::new(self.name, &self.email, self.role)
    }
}

/// Validated `PUT /users/{id}` body; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        let email = optional_str(payload, "email")?.map(|e| e.to_lowercase());
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(ValidationError::field("email", format!("'{}' is not a valid email", email)).into());
            }
        }

        let status = match optional_str(payload, "status")? {
            Some(raw) => Some(UserStatus::parse(&raw).ok_or_else(|| {
                ValidationError::field("status", "must be 'active' or 'inactive'")
            })?),
            None => None,
        };

        Ok(Self {
            name: optional_str(payload, "name")?,
            email,
            role: optional_str(payload, "role")?
                .map(|r| parse_role(&r))
                .transpose()?,
            status,
            avatar: optional_str(payload, "avatar")?,
        })
    }

    /// Whether applying this patch changes anything only an administrator may change
    pub fn touches_privileged_fields(&self, current: &User) -> bool {
        self.role.is_some_and(|r| r != current.role)
            || self.status.is_some_and(|s| s != current.status)
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        user.touch();
    }
}

/// `GET /users` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    /// Comma-separated roles; `all` disables the filter
    pub role: Option<String>,
    /// Comma-separated roles to leave out
    pub exclude_roles: Option<String>,
    /// Case-insensitive substring of name or email
    pub search: Option<String>,
    pub class_id: Option<String>,
}

fn role_list(raw: &Option<String>) -> Option<Vec<Role>> {
    let raw = raw.as_deref()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(raw.split(',').filter_map(|r| r.parse().ok()).collect())
}

impl UserFilter {
    /// Filter on everything but `classId`, which needs enrollment data
    pub fn matches(&self, user: &User) -> bool {
        if let Some(included) = role_list(&self.role) {
            if !included.contains(&user.role) {
                return false;
            }
        }
        if let Some(excluded) = role_list(&self.exclude_roles) {
            if excluded.contains(&user.role) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !user.name.to_lowercase().contains(&needle) && !user.email.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("Emma Wilson", " Emma@School.EDU ", Role::Student);
        assert_eq!(user.email, "emma@school.edu");
        assert!(user.is_active());
        assert_eq!(
            user.avatar,
            "https://ui-avatars.com/api/?name=Emma%20Wilson&background=random&color=fff"
        );
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("O'Brien (Jr.)"), "O'Brien%20(Jr.)");
        assert_eq!(encode_uri_component("Zoë&Co"), "Zo%C3%AB%26Co");
    }

    #[test]
    fn test_new_user_from_payload() {
        let class_id = Uuid::new_v4();
        let parsed = NewUser::from_payload(&json!({
            "name": "Liam Smith",
            "email": "LIAM@school.edu",
            "role": "student",
            "classId": class_id.to_string()
        }))
        .unwrap();
        assert_eq!(parsed.email, "liam@school.edu");
        assert_eq!(parsed.role, Role::Student);
        assert_eq!(parsed.class_id, Some(class_id));
    }

    #[test]
    fn test_new_user_rejects_bad_role_and_email() {
        let bad_role = NewUser::from_payload(&json!({
            "name": "X", "email": "x@school.edu", "role": "principal"
        }));
        assert!(bad_role.is_err());

        let bad_email = NewUser::from_payload(&json!({
            "name": "X", "email": "nope", "role": "staff"
        }));
        assert!(bad_email.is_err());
    }

    #[test]
    fn test_patch_apply_and_privilege_check() {
        let mut user = User::new("Sarah Johnson", "sarah@school.edu", Role::Teacher);
        let patch = UserPatch::from_payload(&json!({"name": "Sarah J.", "role": "teacher"})).unwrap();
        assert!(!patch.touches_privileged_fields(&user));

        patch.apply(&mut user);
        assert_eq!(user.name, "Sarah J.");

        let promote = UserPatch::from_payload(&json!({"role": "admin"})).unwrap();
        assert!(promote.touches_privileged_fields(&user));
        let deactivate = UserPatch::from_payload(&json!({"status": "inactive"})).unwrap();
        assert!(deactivate.touches_privileged_fields(&user));
    }

    #[test]
    fn test_filter_roles_and_search() {
        let teacher = User::new("Sarah Johnson", "sarah@school.edu", Role::Teacher);
        let clerk = User::new("John Doe", "john@school.edu", Role::Clerk);

        let staff_only = UserFilter {
            role: Some("accountant,clerk,librarian".to_string()),
            ..Default::default()
        };
        assert!(staff_only.matches(&clerk));
        assert!(!staff_only.matches(&teacher));

        let not_clerks = UserFilter {
            role: Some("all".to_string()),
            exclude_roles: Some("clerk".to_string()),
            ..Default::default()
        };
        assert!(not_clerks.matches(&teacher));
        assert!(!not_clerks.matches(&clerk));

        let search = UserFilter {
            search: Some("JOHN".to_string()),
            ..Default::default()
        };
        assert!(search.matches(&clerk));
        assert!(search.matches(&teacher));
    }
}
