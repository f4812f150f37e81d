//! Class and enrollment models

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::SchoolResult;
use crate::core::validation::{optional_str, optional_uuid, required_str};
use crate::core::Entity;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn new(name: impl Into<String>, description: Option<String>, teacher_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            teacher_id,
            created_at: Utc::now(),
        }
    }

    pub fn from_payload(payload: &Value) -> SchoolResult<Self> {
        Ok(Self::new(
            required_str(payload, "name")?,
            optional_str(payload, "description")?,
            optional_uuid(payload, "teacherId")?,
        ))
    }
}

impl Entity for Class {
    fn resource_name() -> &'static str {
        "classes"
    }

    fn resource_name_singular() -> &'static str {
        "class"
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
            "teacherId" => self.teacher_id.map(|id| id.to_string()),
            _ => None,
        }
    }
}

/// A student's membership in a class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(student_id: Uuid, class_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            class_id,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Enrollment {
    fn resource_name() -> &'static str {
        "enrollments"
    }

    fn resource_name_singular() -> &'static str {
        "enrollment"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "studentId" => Some(self.student_id.to_string()),
            "classId" => Some(self.class_id.to_string()),
            _ => None,
        }
    }
}

/// Wire shape of a class in listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassView {
    #[serde(flatten)]
    pub class: Class,
    pub student_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_class_from_payload() {
        let class = Class::from_payload(&json!({"name": "Class 6", "description": "Sixth grade"})).unwrap();
        assert_eq!(class.name, "Class 6");
        assert_eq!(class.description.as_deref(), Some("Sixth grade"));
        assert!(class.teacher_id.is_none());

        assert!(Class::from_payload(&json!({"description": "no name"})).is_err());
    }

    #[test]
    fn test_enrollment_search_fields() {
        let student = Uuid::new_v4();
        let enrollment = Enrollment::new(student, Uuid::new_v4());
        assert_eq!(enrollment.field_value("studentId"), Some(student.to_string()));
    }

    #[test]
    fn test_class_view_flattens() {
        let view = ClassView {
            class: Class::new("Class 7", None, None),
            student_count: 2,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Class 7");
        assert_eq!(json["studentCount"], 2);
    }
}
