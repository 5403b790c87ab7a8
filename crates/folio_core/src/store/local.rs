//! Embedded SQLite implementation of the store contract.
//!
//! # Responsibility
//! - Serve local development and tests with the same observable behavior as
//!   the hosted service: server-assigned `id`/`created_at`, `PGRST116` for
//!   missing rows, Postgres constraint codes, anonymous write policy.
//! - Hold admin accounts and the single active session in memory.
//!
//! # Invariants
//! - Anonymous callers may read every table except `messages` and may only
//!   insert into `messages`.
//! - Row ids are never reused (`AUTOINCREMENT`), so a repeated delete of the
//!   same id reports `PGRST116`.
//! - Deleting a category that still owns skills fails with `23503`.

use crate::db::schema::{column, columns, Column, ColumnKind};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::store::{
    AuthProvider, DataStore, Embed, Row, RowId, SelectQuery, Session, StoreError, StoreResult,
    Table, User,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use rusqlite::types::Value as SqlValue;
use rusqlite::{ffi, params_from_iter, Connection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

const RLS_CODE: &str = "42501";
const UNKNOWN_COLUMN_CODE: &str = "PGRST204";
const UNDEFINED_COLUMN_CODE: &str = "42703";
const INVALID_INPUT_CODE: &str = "22P02";

struct Account {
    user_id: String,
    password: String,
}

/// SQLite-backed data service with in-memory email/password accounts.
pub struct LocalStore {
    conn: Mutex<Connection>,
    accounts: Mutex<HashMap<String, Account>>,
    session: Mutex<Option<Session>>,
}

impl LocalStore {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Creates an empty, process-local store.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already carries the portfolio schema.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
        }
    }

    /// Registers an admin account and returns its user.
    pub fn register_admin(&self, email: &str, password: &str) -> User {
        let user_id = Uuid::new_v4().to_string();
        lock(&self.accounts).insert(
            email.trim().to_ascii_lowercase(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        User {
            id: user_id,
            email: Some(email.trim().to_string()),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.conn)
    }

    fn has_session(&self) -> bool {
        lock(&self.session).is_some()
    }

    fn check_policy(&self, action: &'static str, table: Table) -> StoreResult<()> {
        let anonymous_allowed = match action {
            "select" => table != Table::Messages,
            "insert" => table == Table::Messages,
            _ => false,
        };
        if anonymous_allowed || self.has_session() {
            return Ok(());
        }
        Err(StoreError::api(
            401,
            RLS_CODE,
            format!("permission denied: anonymous {action} on table {table}"),
        ))
    }
}

#[async_trait]
impl DataStore for LocalStore {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        let started_at = Instant::now();
        self.check_policy("select", query.table)?;
        let rows = select_rows(&self.conn(), query)?;
        debug!(
            "event=store_select module=store backend=local status=ok table={} rows={} duration_ms={}",
            query.table,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.check_policy("insert", table)?;
        let conn = self.conn();
        let (names, values) = encode_columns(table, &row)?;
        let sql = if names.is_empty() {
            format!("INSERT INTO \"{table}\" DEFAULT VALUES;")
        } else {
            let placeholders = (1..=names.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO \"{table}\" ({}) VALUES ({placeholders});",
                quoted(&names)
            )
        };
        conn.execute(&sql, params_from_iter(values))
            .map_err(map_sqlite_error)?;
        let id = conn.last_insert_rowid();
        debug!("event=store_insert module=store backend=local status=ok table={table} id={id}");
        fetch_row(&conn, table, id)?.ok_or_else(|| StoreError::no_rows("inserted row vanished"))
    }

    async fn update(&self, table: Table, id: RowId, patch: Row) -> StoreResult<Row> {
        self.check_policy("update", table)?;
        let conn = self.conn();
        let (names, mut values) = encode_columns(table, &patch)?;
        if !names.is_empty() {
            let assignments = names
                .iter()
                .enumerate()
                .map(|(index, name)| format!("\"{name}\" = ?{}", index + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE \"{table}\" SET {assignments} WHERE id = ?{};",
                names.len() + 1
            );
            values.push(SqlValue::Integer(id));
            let changed = conn
                .execute(&sql, params_from_iter(values))
                .map_err(map_sqlite_error)?;
            if changed == 0 {
                return Err(missing_row(table, id));
            }
        }
        debug!("event=store_update module=store backend=local status=ok table={table} id={id}");
        fetch_row(&conn, table, id)?.ok_or_else(|| missing_row(table, id))
    }

    async fn delete(&self, table: Table, id: RowId) -> StoreResult<()> {
        self.check_policy("delete", table)?;
        let changed = self
            .conn()
            .execute(&format!("DELETE FROM \"{table}\" WHERE id = ?1;"), [id])
            .map_err(map_sqlite_error)?;
        if changed == 0 {
            return Err(missing_row(table, id));
        }
        debug!("event=store_delete module=store backend=local status=ok table={table} id={id}");
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for LocalStore {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let key = email.trim().to_ascii_lowercase();
        let user_id = {
            let accounts = lock(&self.accounts);
            match accounts.get(&key) {
                Some(account) if account.password == password => account.user_id.clone(),
                _ => {
                    warn!("event=auth_sign_in module=store backend=local status=error reason=invalid_credentials");
                    return Err(StoreError::Unauthorized(
                        "invalid login credentials".to_string(),
                    ));
                }
            }
        };

        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            user: User {
                id: user_id,
                email: Some(email.trim().to_string()),
            },
        };
        *lock(&self.session) = Some(session.clone());
        info!("event=auth_sign_in module=store backend=local status=ok");
        Ok(session)
    }

    async fn sign_out(&self) -> StoreResult<()> {
        lock(&self.session).take();
        info!("event=auth_sign_out module=store backend=local status=ok");
        Ok(())
    }

    async fn current_user(&self) -> StoreResult<Option<User>> {
        Ok(lock(&self.session)
            .as_ref()
            .map(|session| session.user.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn quoted(names: &[&'static str]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn missing_row(table: Table, id: RowId) -> StoreError {
    StoreError::no_rows(format!("no row with id {id} in table {table}"))
}

fn select_rows(conn: &Connection, query: &SelectQuery) -> StoreResult<Vec<Row>> {
    let table = query.table;
    let catalogue = columns(table);
    let names: Vec<&'static str> = catalogue.iter().map(|column| column.name).collect();
    let mut sql = format!("SELECT {} FROM \"{table}\"", quoted(&names));

    if !query.order.is_empty() {
        let mut terms = Vec::with_capacity(query.order.len());
        for term in &query.order {
            if column(table, term.column).is_none() {
                return Err(StoreError::api(
                    400,
                    UNDEFINED_COLUMN_CODE,
                    format!("column {table}.{} does not exist", term.column),
                ));
            }
            let direction = if term.ascending { "ASC" } else { "DESC" };
            terms.push(format!("\"{}\" {direction}", term.column));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql).map_err(map_sqlite_error)?;
    let mut rows = stmt.query([]).map_err(map_sqlite_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(map_sqlite_error)? {
        out.push(decode_row(catalogue, row)?);
    }
    drop(rows);

    if let Some(embed) = query.embed {
        for parent in &mut out {
            let parent_id = parent.get("id").and_then(Value::as_i64).unwrap_or_default();
            let children = select_children(conn, embed, parent_id)?;
            parent.insert(embed.table.as_str().to_string(), Value::Array(children));
        }
    }
    Ok(out)
}

fn select_children(conn: &Connection, embed: Embed, parent_id: RowId) -> StoreResult<Vec<Value>> {
    let catalogue = columns(embed.table);
    let names: Vec<&'static str> = catalogue.iter().map(|column| column.name).collect();
    let sql = format!(
        "SELECT {} FROM \"{}\" WHERE \"{}\" = ?1 ORDER BY id ASC;",
        quoted(&names),
        embed.table,
        embed.foreign_key
    );
    let mut stmt = conn.prepare(&sql).map_err(map_sqlite_error)?;
    let mut rows = stmt.query([parent_id]).map_err(map_sqlite_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(map_sqlite_error)? {
        out.push(Value::Object(decode_row(catalogue, row)?));
    }
    Ok(out)
}

fn fetch_row(conn: &Connection, table: Table, id: RowId) -> StoreResult<Option<Row>> {
    let catalogue = columns(table);
    let names: Vec<&'static str> = catalogue.iter().map(|column| column.name).collect();
    let sql = format!("SELECT {} FROM \"{table}\" WHERE id = ?1;", quoted(&names));
    let mut stmt = conn.prepare(&sql).map_err(map_sqlite_error)?;
    let mut rows = stmt.query([id]).map_err(map_sqlite_error)?;
    match rows.next().map_err(map_sqlite_error)? {
        Some(row) => Ok(Some(decode_row(catalogue, row)?)),
        None => Ok(None),
    }
}

fn decode_row(catalogue: &[Column], row: &rusqlite::Row<'_>) -> StoreResult<Row> {
    let mut out = Row::new();
    for (index, column) in catalogue.iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Integer => row
                .get::<_, Option<i64>>(index)
                .map_err(map_sqlite_error)?
                .map_or(Value::Null, Value::from),
            ColumnKind::Bool => row
                .get::<_, Option<i64>>(index)
                .map_err(map_sqlite_error)?
                .map_or(Value::Null, |flag| Value::Bool(flag != 0)),
            ColumnKind::Text | ColumnKind::Timestamp => row
                .get::<_, Option<String>>(index)
                .map_err(map_sqlite_error)?
                .map_or(Value::Null, Value::String),
            ColumnKind::TextList => match row
                .get::<_, Option<String>>(index)
                .map_err(map_sqlite_error)?
            {
                Some(text) => serde_json::from_str(&text)?,
                None => Value::Null,
            },
        };
        out.insert(column.name.to_string(), value);
    }
    Ok(out)
}

fn encode_columns(table: Table, row: &Row) -> StoreResult<(Vec<&'static str>, Vec<SqlValue>)> {
    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (key, value) in row {
        let column = column(table, key).ok_or_else(|| {
            StoreError::api(
                400,
                UNKNOWN_COLUMN_CODE,
                format!("could not find the '{key}' column of '{table}'"),
            )
        })?;
        names.push(column.name);
        values.push(encode_value(table, column, value)?);
    }
    Ok((names, values))
}

fn encode_value(table: Table, column: Column, value: &Value) -> StoreResult<SqlValue> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    let encoded = match column.kind {
        ColumnKind::Integer => value.as_i64().map(SqlValue::Integer),
        ColumnKind::Bool => value.as_bool().map(|flag| SqlValue::Integer(i64::from(flag))),
        ColumnKind::Text | ColumnKind::Timestamp => {
            value.as_str().map(|text| SqlValue::Text(text.to_string()))
        }
        ColumnKind::TextList => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => {
                Some(SqlValue::Text(serde_json::to_string(items)?))
            }
            _ => None,
        },
    };
    encoded.ok_or_else(|| {
        StoreError::api(
            400,
            INVALID_INPUT_CODE,
            format!("invalid input for {table}.{}: {value}", column.name),
        )
    })
}

fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        let detail = message.clone().unwrap_or_else(|| failure.to_string());
        let mapped = match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_NOTNULL => Some((400, "23502")),
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some((409, "23503")),
            ffi::SQLITE_CONSTRAINT_CHECK => Some((400, "23514")),
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some((409, "23505"))
            }
            _ => None,
        };
        if let Some((status, code)) = mapped {
            return StoreError::api(status, code, detail);
        }
    }
    StoreError::Db(DbError::Sqlite(err))
}

#[cfg(test)]
mod tests {
    use super::LocalStore;
    use crate::store::{AuthProvider, DataStore, OrderTerm, Row, SelectQuery, Table};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().expect("object literal")
    }

    async fn signed_in_store() -> LocalStore {
        let store = LocalStore::in_memory().unwrap();
        store.register_admin("admin@example.com", "secret");
        store.sign_in("admin@example.com", "secret").await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_assigns_id_and_created_at() {
        let store = signed_in_store().await;
        let inserted = store
            .insert(
                Table::Projects,
                row(json!({ "title": "A", "description": "B", "technologies": ["Rust"] })),
            )
            .await
            .unwrap();
        assert!(inserted["id"].as_i64().unwrap() > 0);
        assert!(inserted["created_at"].is_string());
        assert_eq!(inserted["technologies"], json!(["Rust"]));
        assert_eq!(inserted["featured"], json!(false));
    }

    #[tokio::test]
    async fn anonymous_writes_are_rejected_except_messages() {
        let store = LocalStore::in_memory().unwrap();
        let err = store
            .insert(
                Table::Projects,
                row(json!({ "title": "A", "description": "B" })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("42501"));

        let message = store
            .insert(
                Table::Messages,
                row(json!({
                    "name": "Ana", "email": "ana@x.com", "subject": "Hi", "message": "Hello", "read": false
                })),
            )
            .await
            .unwrap();
        assert_eq!(message["read"], json!(false));

        let err = store
            .select(&SelectQuery::new(Table::Messages))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("42501"));
    }

    #[tokio::test]
    async fn missing_rows_report_pgrst116() {
        let store = signed_in_store().await;
        let err = store
            .update(Table::Projects, 42, row(json!({ "title": "x" })))
            .await
            .unwrap_err();
        assert!(err.is_no_rows());
        let err = store.delete(Table::Projects, 42).await.unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn constraint_violations_keep_postgres_codes() {
        let store = signed_in_store().await;
        let err = store
            .insert(Table::Projects, row(json!({ "description": "no title" })))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("23502"));

        let err = store
            .insert(
                Table::Skills,
                row(json!({ "category_id": 99, "name": "Rust", "proficiency": 3 })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("23503"));

        let err = store
            .insert(Table::Projects, row(json!({ "title": "a", "description": "b", "stars": 3 })))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("PGRST204"));
    }

    #[tokio::test]
    async fn order_terms_are_applied_with_id_tiebreak() {
        let store = signed_in_store().await;
        for (title, order_index) in [("b", 1), ("a", 0), ("c", 1)] {
            store
                .insert(
                    Table::SkillCategories,
                    row(json!({ "title": title, "order_index": order_index })),
                )
                .await
                .unwrap();
        }
        let rows = store
            .select(
                &SelectQuery::new(Table::SkillCategories)
                    .order_by(&[OrderTerm::asc("order_index"), OrderTerm::asc("id")]),
            )
            .await
            .unwrap();
        let titles: Vec<&str> = rows.iter().map(|row| row["title"].as_str().unwrap()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let store = LocalStore::in_memory().unwrap();
        store.register_admin("admin@example.com", "secret");
        assert!(store.sign_in("admin@example.com", "nope").await.is_err());
        assert_eq!(store.current_user().await.unwrap(), None);
    }
}
