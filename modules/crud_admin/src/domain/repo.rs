use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{Record, RecordId, StoredRecord};
use crate::domain::shape::ShapeDescriptor;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness / type / nullability violation reported by the engine.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence over any shape.
/// Every write is a single statement that commits immediately.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create one table per shape if missing. Existing tables are left untouched.
    async fn init_schema(&self, shapes: &[ShapeDescriptor]) -> anyhow::Result<()>;

    async fn create(
        &self,
        shape: &ShapeDescriptor,
        record: &Record,
    ) -> Result<StoredRecord, StoreError>;

    /// All rows ordered by id ascending.
    async fn get_all(&self, shape: &ShapeDescriptor) -> anyhow::Result<Vec<StoredRecord>>;

    async fn get_by_id(
        &self,
        shape: &ShapeDescriptor,
        id: RecordId,
    ) -> anyhow::Result<Option<StoredRecord>>;

    /// Returns true if a row was removed.
    async fn delete(&self, shape: &ShapeDescriptor, id: RecordId) -> anyhow::Result<bool>;
}
