//! Data access for one resource.
//!
//! A `ResourceService` is a pass-through: it binds a [`ResourceDef`] to a
//! [`QueryBackend`] and exposes the five CRUD operations. All validation and
//! shaping happens in the router.

use std::sync::Arc;

use noteful_core::{Record, ResourceDef, ResourceId};

use crate::backend::QueryBackend;
use crate::error::StoreResult;

/// CRUD operations for a single resource table.
#[derive(Debug, Clone)]
pub struct ResourceService {
    resource: &'static ResourceDef,
    backend: Arc<dyn QueryBackend>,
}

impl ResourceService {
    /// Bind `resource` to `backend`.
    pub fn new(resource: &'static ResourceDef, backend: Arc<dyn QueryBackend>) -> Self {
        Self { resource, backend }
    }

    /// The resource this service operates on.
    pub fn resource(&self) -> &'static ResourceDef {
        self.resource
    }

    /// Every row, unordered.
    pub async fn get_all(&self) -> StoreResult<Vec<Record>> {
        self.backend.select_all(self.resource).await
    }

    /// The row with `id`; `None` when it does not exist.
    pub async fn get_by_id(&self, id: ResourceId) -> StoreResult<Option<Record>> {
        self.backend.select_by_id(self.resource, id).await
    }

    /// Persist a new row and return it with its generated `id`.
    pub async fn insert(&self, new_entity: &Record) -> StoreResult<Record> {
        let row = self.backend.insert_returning(self.resource, new_entity).await?;
        tracing::debug!(table = self.resource.table, id = ?row.get("id"), "Inserted row");
        Ok(row)
    }

    /// Apply `fields` to the row with `id`. Returns rows affected (0 or 1).
    pub async fn update(&self, id: ResourceId, fields: &Record) -> StoreResult<u64> {
        self.backend.update(self.resource, id, fields).await
    }

    /// Delete the row with `id`. Returns rows affected (0 or 1).
    pub async fn delete(&self, id: ResourceId) -> StoreResult<u64> {
        self.backend.delete(self.resource, id).await
    }
}
