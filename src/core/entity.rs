//! Entity trait shared by every stored record

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all stored records.
///
/// Storage backends only need an id, a creation timestamp and a way to read
/// a field as text for [`DataService::search`](crate::core::DataService::search).
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "users", "notices")
    fn resource_name() -> &'static str;

    /// The singular resource name used in error messages
    fn resource_name_singular() -> &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Text value of a named field, `None` if the field is unknown or unset
    fn field_value(&self, field: &str) -> Option<String>;
}
