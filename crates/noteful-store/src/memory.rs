//! In-process query backend.
//!
//! `MemoryStore` keeps each table in a `BTreeMap` keyed by id and mirrors the
//! PostgreSQL schema's observable behaviour: sequential ids starting at 1,
//! NOT NULL on every resource column, column coercion shared with [`Store`].
//! Used by the router tests and by `DATABASE_URL=memory` local runs.
//!
//! [`Store`]: crate::Store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use noteful_core::{Record, ResourceDef, ResourceId};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::backend::{QueryBackend, coerce_record};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    last_id: ResourceId,
    rows: BTreeMap<ResourceId, Record>,
}

/// Query backend holding every table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held for `resource`.
    pub async fn row_count(&self, resource: &ResourceDef) -> usize {
        self.tables
            .read()
            .await
            .get(resource.table)
            .map_or(0, |table| table.rows.len())
    }
}

fn not_null(resource: &ResourceDef, column: &str) -> StoreError {
    StoreError::InvalidValue {
        table: resource.table,
        column: column.to_string(),
        reason: "null value violates not-null constraint".to_string(),
    }
}

#[async_trait]
impl QueryBackend for MemoryStore {
    async fn select_all(&self, resource: &'static ResourceDef) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource.table)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn select_by_id(
        &self,
        resource: &'static ResourceDef,
        id: ResourceId,
    ) -> StoreResult<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource.table)
            .and_then(|table| table.rows.get(&id).cloned()))
    }

    async fn insert_returning(
        &self,
        resource: &'static ResourceDef,
        values: &Record,
    ) -> StoreResult<Record> {
        let values = coerce_record(resource, values)?;

        let mut row = Record::new();
        for field in resource.fields {
            let value = values
                .iter()
                .find(|(f, _)| f.name == field.name)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null);
            if value.is_null() {
                return Err(not_null(resource, field.name));
            }
            row.insert(field.name.to_string(), value);
        }

        let mut tables = self.tables.write().await;
        let table = tables.entry(resource.table).or_default();
        table.last_id += 1;
        let id = table.last_id;
        row.insert("id".to_string(), Value::from(id));
        table.rows.insert(id, row.clone());

        Ok(row)
    }

    async fn update(
        &self,
        resource: &'static ResourceDef,
        id: ResourceId,
        values: &Record,
    ) -> StoreResult<u64> {
        let values = coerce_record(resource, values)?;
        if let Some((field, _)) = values.iter().find(|(_, v)| v.is_null()) {
            return Err(not_null(resource, field.name));
        }

        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(resource.table)
            .and_then(|table| table.rows.get_mut(&id))
        else {
            return Ok(0);
        };
        if values.is_empty() {
            return Ok(0);
        }
        for (field, value) in values {
            row.insert(field.name.to_string(), value);
        }
        Ok(1)
    }

    async fn delete(&self, resource: &'static ResourceDef, id: ResourceId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(resource.table)
            .and_then(|table| table.rows.remove(&id));
        Ok(u64::from(removed.is_some()))
    }
}
