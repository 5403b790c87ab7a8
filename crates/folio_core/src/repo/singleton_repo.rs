//! Singleton content access (profile, about) with probe-then-branch upsert.
//!
//! # Responsibility
//! - Read "the" row of a singleton table, treating absence as no data.
//! - Upsert by probing for the existing id, then updating or inserting.
//!
//! # Invariants
//! - The probe and the write are two requests; they are not atomic against
//!   the store. Upserts through one repository instance are serialized, so
//!   only writers in other processes or sessions can race the probe.
//! - With duplicate rows present, the lowest `id` is "the" row.

use crate::model::validate::{Validate, ValidationError};
use crate::repo::entity::Editable;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::table_repo::TableRepository;
use crate::store::{DataStore, OrderTerm, SelectQuery};
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Repository for a table expected to hold at most one row.
pub struct SingletonRepository<E> {
    table: TableRepository<E>,
    write_lock: Mutex<()>,
}

impl<E> SingletonRepository<E>
where
    E: Editable,
    E::Patch: Clone,
    E::Fields: TryFrom<E::Patch, Error = ValidationError>,
{
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            table: TableRepository::new(store),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the singleton row, or `None` when none exists yet.
    pub async fn get(&self) -> RepoResult<Option<E>> {
        let query = SelectQuery::new(E::TABLE)
            .order_by(&[OrderTerm::asc("id")])
            .limit(2);
        let mut rows = match self.table.select(query).await {
            Ok(rows) => rows,
            Err(RepoError::Store(err)) if err.is_no_rows() => return Ok(None),
            Err(err) => return Err(err),
        };
        if rows.len() > 1 {
            warn!(
                "event=singleton_duplicate module=repo status=warn table={} rows={}",
                E::TABLE,
                rows.len()
            );
        }
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    /// Updates the existing row, or inserts the first one.
    ///
    /// The insert branch needs every required column in `patch`.
    pub async fn upsert(&self, patch: &E::Patch) -> RepoResult<E> {
        patch.validate()?;
        let _guard = self.write_lock.lock().await;
        match self.get().await? {
            Some(existing) => self.table.update(existing.id(), patch).await,
            None => {
                let fields = E::Fields::try_from(patch.clone())?;
                self.table.create(&fields).await
            }
        }
    }
}
