//! Embedded store schema and column catalogue.
//!
//! # Responsibility
//! - Create the portfolio tables on first open, in strictly increasing steps.
//! - Describe each table's columns so rows can move between JSON and SQLite.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied schema version is mirrored to `PRAGMA user_version`.
//! - Every table has `id` and `created_at`; list columns are JSON text.

use crate::db::{DbError, DbResult};
use crate::store::Table;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_portfolio.sql"),
}];

/// Storage class of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// Stored as `0`/`1`.
    Bool,
    /// Ordered list of strings stored as JSON text.
    TextList,
    /// RFC 3339 text.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

use ColumnKind::{Bool, Integer, Text, TextList, Timestamp};

const PROFILE_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("name", Text),
    col("title", Text),
    col("description", Text),
    col("hero_image_url", Text),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

const ABOUT_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("content", Text),
    col("traits", TextList),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

const CONTACT_INFO_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("type", Text),
    col("label", Text),
    col("value", Text),
    col("href", Text),
    col("icon", Text),
    col("order_index", Integer),
    col("created_at", Timestamp),
];

const MESSAGES_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("name", Text),
    col("email", Text),
    col("subject", Text),
    col("message", Text),
    col("read", Bool),
    col("created_at", Timestamp),
];

const SKILL_CATEGORIES_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("title", Text),
    col("order_index", Integer),
    col("created_at", Timestamp),
];

const SKILLS_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("category_id", Integer),
    col("name", Text),
    col("proficiency", Integer),
    col("order_index", Integer),
    col("created_at", Timestamp),
];

const PROJECTS_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("title", Text),
    col("description", Text),
    col("technologies", TextList),
    col("image_url", Text),
    col("github_url", Text),
    col("live_url", Text),
    col("featured", Bool),
    col("order_index", Integer),
    col("created_at", Timestamp),
];

const SERVICES_COLUMNS: &[Column] = &[
    col("id", Integer),
    col("title", Text),
    col("description", Text),
    col("icon", Text),
    col("features", TextList),
    col("order_index", Integer),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

/// Returns the column catalogue of `table` in declaration order.
pub fn columns(table: Table) -> &'static [Column] {
    match table {
        Table::Profile => PROFILE_COLUMNS,
        Table::About => ABOUT_COLUMNS,
        Table::ContactInfo => CONTACT_INFO_COLUMNS,
        Table::Messages => MESSAGES_COLUMNS,
        Table::SkillCategories => SKILL_CATEGORIES_COLUMNS,
        Table::Skills => SKILLS_COLUMNS,
        Table::Projects => PROJECTS_COLUMNS,
        Table::Services => SERVICES_COLUMNS,
    }
}

/// Looks up one column of `table` by name.
pub fn column(table: Table, name: &str) -> Option<Column> {
    columns(table).iter().copied().find(|column| column.name == name)
}

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Applies all pending schema steps on the provided connection.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS {
        if step.version <= current_version {
            continue;
        }

        tx.execute_batch(step.sql)
            .and_then(|()| tx.execute_batch(&format!("PRAGMA user_version = {};", step.version)))
            .map_err(|source| DbError::SchemaStep {
                version: step.version,
                source,
            })?;
        info!(
            "event=db_schema module=db status=ok from_version={current_version} to_version={}",
            step.version
        );
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{column, columns, ColumnKind};
    use crate::store::Table;

    #[test]
    fn every_table_has_identity_columns() {
        for table in Table::ALL {
            assert!(column(table, "id").is_some(), "{table} has no id");
            assert!(column(table, "created_at").is_some(), "{table} has no created_at");
        }
    }

    #[test]
    fn list_columns_are_catalogued() {
        assert_eq!(
            column(Table::Projects, "technologies").map(|column| column.kind),
            Some(ColumnKind::TextList)
        );
        assert_eq!(
            column(Table::Messages, "read").map(|column| column.kind),
            Some(ColumnKind::Bool)
        );
        assert_eq!(columns(Table::SkillCategories).len(), 4);
    }
}
