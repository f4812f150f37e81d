//! Service trait for record storage

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::entity::Entity;
use crate::core::error::SchoolResult;

/// Service trait for managing stored records
///
/// Implementations provide CRUD operations for a specific record type.
/// Handlers never see the underlying storage mechanism.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Store a new record; fails if the id is already taken
    async fn create(&self, entity: T) -> SchoolResult<T>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> SchoolResult<Option<T>>;

    /// List all records in insertion order
    async fn list(&self) -> SchoolResult<Vec<T>>;

    /// Replace an existing record
    async fn update(&self, id: &Uuid, entity: T) -> SchoolResult<T>;

    /// Delete a record, returning it if it existed
    async fn delete(&self, id: &Uuid) -> SchoolResult<Option<T>>;

    /// Records whose field equals `value` (case-insensitive)
    async fn search(&self, field: &str, value: &str) -> SchoolResult<Vec<T>>;
}
