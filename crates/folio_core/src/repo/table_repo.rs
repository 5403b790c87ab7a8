//! Generic CRUD repository shared by every collection entity.
//!
//! # Responsibility
//! - Turn one typed intent into exactly one store request.
//! - Decode rows into records and map store failures to [`RepoError`].
//!
//! # Invariants
//! - Payloads are validated before any request is issued.
//! - An empty table lists as an empty vector.
//! - Update/delete of a missing id is [`RepoError::NotFound`]; a repeated
//!   delete is not idempotent.

use crate::model::validate::Validate;
use crate::repo::entity::{Editable, Entity};
use crate::repo::error::{RepoError, RepoResult};
use crate::store::{DataStore, OrderTerm, Row, RowId, SelectQuery, StoreError, Table};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed access to the table behind `E`.
pub struct TableRepository<E> {
    store: Arc<dyn DataStore>,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for TableRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> TableRepository<E> {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Lists every row in the entity's default order.
    pub async fn list(&self) -> RepoResult<Vec<E>> {
        self.list_by(E::ORDER).await
    }

    /// Lists every row in a caller-chosen order.
    pub async fn list_by(&self, order: &[OrderTerm]) -> RepoResult<Vec<E>> {
        self.select(SelectQuery::new(E::TABLE).order_by(order)).await
    }

    pub(crate) async fn select(&self, query: SelectQuery) -> RepoResult<Vec<E>> {
        let rows = self.store.select(&query).await?;
        rows.into_iter().map(|row| decode(E::TABLE, row)).collect()
    }

    /// Inserts one row; the store assigns `id` and `created_at`.
    pub async fn create(&self, fields: &E::Fields) -> RepoResult<E> {
        fields.validate()?;
        let row = encode(E::TABLE, fields)?;
        self.insert_row(row).await
    }

    pub(crate) async fn insert_row(&self, row: Row) -> RepoResult<E> {
        let inserted = self.store.insert(E::TABLE, row).await?;
        decode(E::TABLE, inserted)
    }

    /// Deletes row `id`.
    pub async fn delete(&self, id: RowId) -> RepoResult<()> {
        self.store
            .delete(E::TABLE, id)
            .await
            .map_err(|err| not_found_or_store(E::TABLE, id, err))
    }
}

impl<E: Editable> TableRepository<E> {
    /// Applies the columns present in `patch` to row `id`.
    pub async fn update(&self, id: RowId, patch: &E::Patch) -> RepoResult<E> {
        patch.validate()?;
        let mut row = encode(E::TABLE, patch)?;
        if E::TRACKS_UPDATED_AT {
            row.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
        let updated = self
            .store
            .update(E::TABLE, id, row)
            .await
            .map_err(|err| not_found_or_store(E::TABLE, id, err))?;
        decode(E::TABLE, updated)
    }
}

fn not_found_or_store(table: Table, id: RowId, err: StoreError) -> RepoError {
    if err.is_no_rows() {
        RepoError::NotFound { table, id }
    } else {
        RepoError::Store(err)
    }
}

pub(crate) fn encode<T: Serialize>(table: Table, value: &T) -> RepoResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(RepoError::InvalidData(format!(
            "{table} payload is not an object: {other}"
        ))),
        Err(err) => Err(RepoError::InvalidData(format!("{table} payload: {err}"))),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(table: Table, row: Row) -> RepoResult<T> {
    serde_json::from_value(Value::Object(row))
        .map_err(|err| RepoError::InvalidData(format!("{table} row: {err}")))
}
