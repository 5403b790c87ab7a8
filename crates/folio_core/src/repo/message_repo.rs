//! Inbound contact messages.
//!
//! # Invariants
//! - Messages are append-only from the public side; `read` is `false` on
//!   insert and never changed here.

use crate::model::contact::{Message, MessageFields};
use crate::model::validate::Validate;
use crate::repo::error::RepoResult;
use crate::repo::table_repo::{encode, TableRepository};
use crate::store::{DataStore, RowId, Table};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct MessageRepository {
    table: TableRepository<Message>,
}

impl MessageRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            table: TableRepository::new(store),
        }
    }

    /// Stores a contact form submission as an unread message.
    pub async fn submit(&self, fields: &MessageFields) -> RepoResult<Message> {
        fields.validate()?;
        let mut row = encode(Table::Messages, fields)?;
        row.insert("read".to_string(), Value::Bool(false));
        self.table.insert_row(row).await
    }

    /// Lists messages newest first.
    pub async fn list(&self) -> RepoResult<Vec<Message>> {
        self.table.list().await
    }

    pub async fn delete(&self, id: RowId) -> RepoResult<()> {
        self.table.delete(id).await
    }
}
