//! SQLite bootstrap for the embedded portfolio store.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `LocalStore`.
//! - Create the portfolio tables before the first read or write.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No row is read or written before the schema bootstrap succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod schema;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Embedded store bootstrap or query failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema step failed; the transaction was rolled back.
    SchemaStep {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Underlying SQLite failure, when there is one.
    pub fn sqlite(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Sqlite(err) | Self::SchemaStep { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "embedded store error: {err}"),
            Self::SchemaStep { version, source } => {
                write!(f, "embedded store schema step {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "embedded store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.sqlite().map(|err| err as &(dyn Error + 'static))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
