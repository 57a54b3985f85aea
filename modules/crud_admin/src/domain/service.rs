use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::contract::model::{RecordId, StoredRecord};
use crate::domain::error::DomainError;
use crate::domain::repo::{RecordStore, StoreError};
use crate::domain::shape::{EntityRegistry, ShapeDescriptor};
use crate::domain::validator::{self, RawFields};

/// Domain service: shape lookup, validation and persistence for every entity kind.
pub struct Service {
    store: Arc<dyn RecordStore>,
    registry: Arc<EntityRegistry>,
}

impl Service {
    pub fn new(store: Arc<dyn RecordStore>, registry: Arc<EntityRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn shape(&self, slug: &str) -> Result<&ShapeDescriptor, DomainError> {
        self.registry
            .get(slug)
            .ok_or_else(|| DomainError::unknown_entity(slug))
    }

    /// Create the backing tables for all registered shapes.
    pub async fn init_schema(&self) -> Result<(), DomainError> {
        self.store
            .init_schema(self.registry.shapes())
            .await
            .map_err(|e| {
                error!("Failed to create tables: {:#}", e);
                DomainError::database(e.to_string())
            })?;
        info!(
            entities = self.registry.shapes().len(),
            "schema initialized"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, slug: &str) -> Result<Vec<StoredRecord>, DomainError> {
        let shape = self.shape(slug)?;
        let rows = self.store.get_all(shape).await.map_err(|e| {
            error!("Failed to list {}: {:#}", slug, e);
            DomainError::database(e.to_string())
        })?;
        debug!(count = rows.len(), "listed records");
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, slug: &str, id: RecordId) -> Result<StoredRecord, DomainError> {
        let shape = self.shape(slug)?;
        match self.store.get_by_id(shape, id).await {
            Ok(Some(rec)) => Ok(rec),
            Ok(None) => {
                info!("record not found");
                Err(DomainError::not_found(&shape.title, id))
            }
            Err(e) => {
                error!("Failed to load {} {}: {:#}", slug, id, e);
                Err(DomainError::database(e.to_string()))
            }
        }
    }

    /// Validate the submitted fields and insert a new row.
    #[instrument(skip(self, raw), fields(submitted = raw.len()))]
    pub async fn create(&self, slug: &str, raw: &RawFields) -> Result<StoredRecord, DomainError> {
        let shape = self.shape(slug)?;

        let record = validator::validate(raw, shape).map_err(|e| {
            warn!(field = %e.field, reason = %e.reason, "form rejected");
            DomainError::from(e)
        })?;

        let stored = self
            .store
            .create(shape, &record)
            .await
            .map_err(|e| match e {
                StoreError::Constraint(message) => {
                    warn!("insert rejected by constraint: {}", message);
                    DomainError::constraint(message)
                }
                StoreError::Backend(e) => {
                    error!("Failed to insert into {}: {:#}", shape.table, e);
                    DomainError::database(e.to_string())
                }
            })?;

        info!(id = stored.id, "record created");
        Ok(stored)
    }

    /// Delete by id. A missing row is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, slug: &str, id: RecordId) -> Result<(), DomainError> {
        let shape = self.shape(slug)?;
        let removed = self.store.delete(shape, id).await.map_err(|e| {
            error!("Failed to delete {} {}: {:#}", slug, id, e);
            DomainError::database(e.to_string())
        })?;

        if removed {
            info!("record deleted");
        } else {
            debug!("no row matched; delete treated as done");
        }
        Ok(())
    }
}
