use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// PostgREST code for "zero rows where exactly one was expected".
pub const NO_ROWS_CODE: &str = "PGRST116";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by, or while talking to, the backing service.
#[derive(Debug)]
pub enum StoreError {
    /// Service answered with an error payload.
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// Request never produced a response.
    Transport(String),
    /// Response body could not be decoded.
    Decode(String),
    /// Embedded store failure.
    Db(DbError),
    /// Operation requires a signed-in session.
    Unauthorized(String),
}

impl StoreError {
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub(crate) fn no_rows(message: impl Into<String>) -> Self {
        Self::api(406, NO_ROWS_CODE, message)
    }

    /// Machine-readable service code, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is the "no rows" answer to a single-row request.
    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS_CODE)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api {
                status,
                code: Some(code),
                message,
            } => write!(f, "store error {code} (http {status}): {message}"),
            Self::Api {
                status,
                code: None,
                message,
            } => write!(f, "store error (http {status}): {message}"),
            Self::Transport(message) => write!(f, "store unreachable: {message}"),
            Self::Decode(message) => write!(f, "invalid store response: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unauthorized(message) => write!(f, "unauthorized: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
