//! Reusable field validators over JSON payloads

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{SchoolResult, ValidationError};

/// A field counts as present when it is neither absent, null nor a blank string
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Fail with every missing field at once
pub fn require_fields(payload: &Value, fields: &[&str]) -> SchoolResult<()> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|f| !is_present(payload.get(**f)))
        .map(|f| f.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing).into())
    }
}

/// Trimmed string value of a required field
pub fn required_str(payload: &Value, field: &str) -> SchoolResult<String> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(ValidationError::MissingFields(vec![field.to_string()]).into())
        }
        Some(_) => Err(ValidationError::field(field, "must be a string").into()),
    }
}

/// Trimmed string value of an optional field; blank strings count as absent
pub fn optional_str(payload: &Value, field: &str) -> SchoolResult<Option<String>> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::field(field, "must be a string").into()),
    }
}

pub fn optional_bool(payload: &Value, field: &str) -> SchoolResult<Option<bool>> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::field(field, "must be a boolean").into()),
    }
}

pub fn required_uuid(payload: &Value, field: &str) -> SchoolResult<Uuid> {
    let raw = required_str(payload, field)?;
    parse_uuid(&raw)
}

pub fn optional_uuid(payload: &Value, field: &str) -> SchoolResult<Option<Uuid>> {
    optional_str(payload, field)?
        .map(|raw| parse_uuid(&raw))
        .transpose()
}

/// Parse an identifier taken from a path or payload
pub fn parse_uuid(raw: &str) -> SchoolResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ValidationError::InvalidUuid {
            value: raw.to_string(),
        }
        .into()
    })
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SchoolError;
    use serde_json::json;

    #[test]
    fn test_require_fields_reports_all_missing() {
        let payload = json!({"studentId": "x", "description": "  ", "amount": null});
        let err = require_fields(&payload, &["studentId", "description", "amount", "dueDate"])
            .unwrap_err();
        match err {
            SchoolError::Validation(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["description", "amount", "dueDate"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_numbers_and_bools_count_as_present() {
        let payload = json!({"amount": 0, "isPinned": false});
        assert!(require_fields(&payload, &["amount", "isPinned"]).is_ok());
    }

    #[test]
    fn test_required_str_trims() {
        let payload = json!({"title": "  Sports Day "});
        assert_eq!(required_str(&payload, "title").unwrap(), "Sports Day");
        assert!(required_str(&json!({"title": 3}), "title").is_err());
    }

    #[test]
    fn test_optional_str_blank_is_none() {
        let payload = json!({"transactionId": ""});
        assert_eq!(optional_str(&payload, "transactionId").unwrap(), None);
        assert_eq!(optional_str(&json!({}), "notes").unwrap(), None);
    }

    #[test]
    fn test_uuid_fields() {
        let id = Uuid::new_v4();
        let payload = json!({"studentId": id.to_string(), "classId": "nope"});
        assert_eq!(required_uuid(&payload, "studentId").unwrap(), id);
        assert!(optional_uuid(&payload, "classId").is_err());
        assert_eq!(optional_uuid(&payload, "teacherId").unwrap(), None);
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("emma.wilson@school.edu"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
    }
}
