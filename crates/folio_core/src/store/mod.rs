//! Remote data service boundary.
//!
//! # Responsibility
//! - Define the table-level request contract the repositories depend on.
//! - Define the authentication contract used by the admin surface.
//! - Host the HTTP (PostgREST/GoTrue) and embedded SQLite implementations.
//!
//! # Invariants
//! - One trait call maps to exactly one request against the backing service.
//! - Update/delete of a missing row fails with code `PGRST116`.
//! - Error codes reported by the service are kept verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

mod error;
pub mod local;
pub mod rest;

pub use error::{StoreError, StoreResult, NO_ROWS_CODE};

/// One JSON row as exchanged with the service.
pub type Row = Map<String, Value>;

/// Server-assigned primary key.
pub type RowId = i64;

/// Tables exposed by the portfolio schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Profile,
    About,
    ContactInfo,
    Messages,
    SkillCategories,
    Skills,
    Projects,
    Services,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Profile,
        Table::About,
        Table::ContactInfo,
        Table::Messages,
        Table::SkillCategories,
        Table::Skills,
        Table::Projects,
        Table::Services,
    ];

    /// Table name on the wire and in the embedded schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::About => "about",
            Self::ContactInfo => "contact_info",
            Self::Messages => "messages",
            Self::SkillCategories => "skill_categories",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Services => "services",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderTerm {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// Child rows embedded under each parent row of a select.
///
/// Rendered as `select=*,<child>(*)`; children land under a key named after
/// the child table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: &'static str,
}

/// Read request against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: Table,
    pub order: Vec<OrderTerm>,
    pub embed: Option<Embed>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            order: Vec::new(),
            embed: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, terms: &[OrderTerm]) -> Self {
        self.order.extend_from_slice(terms);
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Table-level CRUD contract of the backing service.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns matching rows; an empty table is an empty vector, not an error.
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>>;
    /// Inserts one row and returns it with server-assigned columns.
    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row>;
    /// Applies `patch` to row `id` and returns the updated row.
    async fn update(&self, table: Table, id: RowId, patch: Row) -> StoreResult<Row>;
    /// Deletes row `id`.
    async fn delete(&self, table: Table, id: RowId) -> StoreResult<()>;
}

/// Authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Active sign-in session. The token is opaque to this crate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Email/password authentication contract.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session>;
    async fn sign_out(&self) -> StoreResult<()>;
    /// Returns the signed-in user, `None` when there is no session.
    async fn current_user(&self) -> StoreResult<Option<User>>;
}

/// A backing service providing both data and authentication.
pub trait Backend: DataStore + AuthProvider {}

impl<T: DataStore + AuthProvider> Backend for T {}
