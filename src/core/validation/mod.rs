//! Request payload validation
//!
//! Create and update handlers receive raw JSON objects and run them through
//! these helpers before building typed records, so that every missing or
//! malformed field is reported with the same error shape.

pub mod validators;

pub use validators::{
    is_valid_email, optional_bool, optional_str, optional_uuid, parse_uuid, require_fields,
    required_str, required_uuid,
};
