//! Typed error handling for the school-office service
//!
//! Every fallible operation that can reach an HTTP caller returns a
//! [`SchoolError`]. Each variant wraps a category enum that knows its own
//! HTTP status and stable machine-readable code, so handlers can simply
//! propagate with `?` and let [`IntoResponse`] render the body.
//!
//! # Error Categories
//!
//! - [`EntityError`]: missing or conflicting records
//! - [`ValidationError`]: malformed or missing input
//! - [`RequestError`]: authentication and authorization failures
//! - [`LedgerError`]: payment rules (nothing owed, already paid, overpayment)
//! - [`ConfigError`]: configuration and seed loading
//! - [`StorageError`]: storage backend failures
//!
//! # Example
//!
//! ```rust,ignore
//! match recorder.record_for_student(student_id, request).await {
//!     Ok(payment) => println!("recorded {}", payment.id),
//!     Err(SchoolError::Ledger(LedgerError::NoOutstandingInvoice { .. })) => {
//!         println!("nothing owed");
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// The main error type of the service
#[derive(Debug, thiserror::Error)]
pub enum SchoolError {
    /// Record lookups and uniqueness
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Input validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authentication / authorization
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Fee ledger rules
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Configuration and seed files
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SchoolError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SchoolError::Entity(e) => e.status_code(),
            SchoolError::Validation(_) => StatusCode::BAD_REQUEST,
            SchoolError::Request(e) => e.status_code(),
            SchoolError::Ledger(e) => e.status_code(),
            SchoolError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SchoolError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SchoolError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SchoolError::Entity(e) => e.error_code(),
            SchoolError::Validation(_) => "VALIDATION_ERROR",
            SchoolError::Request(e) => e.error_code(),
            SchoolError::Ledger(e) => e.error_code(),
            SchoolError::Config(_) => "CONFIG_ERROR",
            SchoolError::Storage(_) => "STORAGE_ERROR",
            SchoolError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Shorthand for a missing record
    pub fn not_found(entity_type: &str, id: Uuid) -> Self {
        SchoolError::Entity(EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        })
    }

    /// Shorthand for an authorization failure
    pub fn forbidden(message: impl Into<String>) -> Self {
        SchoolError::Request(RequestError::Forbidden {
            message: message.into(),
        })
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SchoolError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            SchoolError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            SchoolError::Validation(ValidationError::MissingFields(fields)) => {
                Some(serde_json::json!({ "missing": fields }))
            }
            SchoolError::Ledger(LedgerError::NoOutstandingInvoice { student_id }) => {
                Some(serde_json::json!({ "student_id": student_id.to_string() }))
            }
            SchoolError::Ledger(LedgerError::Overpayment {
                invoice_id,
                outstanding,
                tendered,
            }) => Some(serde_json::json!({
                "invoice_id": invoice_id.to_string(),
                "outstanding": outstanding.to_string(),
                "tendered": tendered.to_string()
            })),
            _ => None,
        }
    }
}

impl IntoResponse for SchoolError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to record lookups and uniqueness
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Record was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// A unique field is already taken
    #[error("{entity_type} with {field} '{value}' already exists")]
    AlreadyExists {
        entity_type: String,
        field: String,
        value: String,
    },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Required fields absent from the payload
    #[error("Please provide all required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Body is not valid JSON or has the wrong shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Invalid UUID format
    #[error("Invalid UUID format: {value}")]
    InvalidUuid { value: String },
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to the caller's identity and permissions
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No usable identity on the request
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Identity known but not allowed
    #[error("Forbidden: {message}")]
    Forbidden { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

// =============================================================================
// Ledger Errors
// =============================================================================

/// Errors raised by the payment rules
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Payment attempted for a student who owes nothing
    #[error("No outstanding invoices found for student '{student_id}'")]
    NoOutstandingInvoice { student_id: Uuid },

    /// Payment attempted against an invoice that is settled
    #[error("Invoice '{invoice_id}' is already paid")]
    InvoiceAlreadyPaid { invoice_id: Uuid },

    /// Payment larger than what the invoice still owes
    #[error(
        "Payment of {tendered} exceeds the outstanding balance of {outstanding} on invoice '{invoice_id}'"
    )]
    Overpayment {
        invoice_id: Uuid,
        outstanding: Decimal,
        tendered: Decimal,
    },

    /// A ledger total does not fit in a decimal
    #[error("Ledger total is too large to compute")]
    AmountOverflow,
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::NoOutstandingInvoice { .. } => StatusCode::CONFLICT,
            LedgerError::InvoiceAlreadyPaid { .. } => StatusCode::CONFLICT,
            LedgerError::Overpayment { .. } => StatusCode::BAD_REQUEST,
            LedgerError::AmountOverflow => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::NoOutstandingInvoice { .. } => "NO_OUTSTANDING_INVOICE",
            LedgerError::InvoiceAlreadyPaid { .. } => "INVOICE_ALREADY_PAID",
            LedgerError::Overpayment { .. } => "OVERPAYMENT",
            LedgerError::AmountOverflow => "AMOUNT_OVERFLOW",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration and seed files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse a YAML document
    #[error("Failed to parse {}: {message}", file.as_deref().unwrap_or("config"))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading a file
    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A lock guarding a collection was poisoned by a panicking writer
    #[error("Storage lock for '{resource}' is poisoned")]
    LockPoisoned { resource: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for SchoolError {
    fn from(err: serde_json::Error) -> Self {
        SchoolError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for SchoolError {
    fn from(err: serde_yaml::Error) -> Self {
        SchoolError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for SchoolError {
    fn from(err: std::io::Error) -> Self {
        SchoolError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for service operations
pub type SchoolResult<T> = Result<T, SchoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_error_display() {
        let err = EntityError::NotFound {
            entity_type: "invoice".to_string(),
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("invoice"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_entity_error_status_code() {
        assert_eq!(
            SchoolError::not_found("user", Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );

        let err = EntityError::AlreadyExists {
            entity_type: "user".to_string(),
            field: "email".to_string(),
            value: "a@b.io".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_fields_message_lists_fields() {
        let err = ValidationError::MissingFields(vec!["amount".into(), "dueDate".into()]);
        let display = err.to_string();
        assert!(display.contains("amount, dueDate"));
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "email".to_string(),
                message: "invalid format".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("name: required"));
        assert!(display.contains("email: invalid format"));
    }

    #[test]
    fn test_ledger_error_codes() {
        let err: SchoolError = LedgerError::NoOutstandingInvoice {
            student_id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "NO_OUTSTANDING_INVOICE");
        assert!(err.to_response().details.is_some());

        let err: SchoolError = LedgerError::Overpayment {
            invoice_id: Uuid::nil(),
            outstanding: Decimal::new(6000, 2),
            tendered: Decimal::new(7000, 2),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("60.00"));

        let err: SchoolError = LedgerError::AmountOverflow.into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "AMOUNT_OVERFLOW");
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::Unauthorized {
                message: "test".to_string()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SchoolError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let err = SchoolError::not_found("notice", Uuid::nil());
        let response = err.to_response();
        assert_eq!(response.code, "ENTITY_NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SchoolError = json_err.into();
        assert!(matches!(
            err,
            SchoolError::Validation(ValidationError::InvalidJson { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_config_parse_error_names_file() {
        let err = ConfigError::ParseError {
            file: Some("school.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("school.yaml"));
    }
}
