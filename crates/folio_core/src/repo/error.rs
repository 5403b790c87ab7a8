use crate::model::validate::ValidationError;
use crate::store::{RowId, StoreError, Table};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Typed failure of a repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Payload rejected before any request was issued.
    Validation(ValidationError),
    /// Update/delete target does not exist.
    NotFound { table: Table, id: RowId },
    /// Any other backend failure, kept verbatim.
    Store(StoreError),
    /// Row returned by the store does not match the entity shape.
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Backend error code, when the failure came from the store.
    pub fn store_code(&self) -> Option<&str> {
        match self {
            Self::Store(err) => err.code(),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
