//! Document store bootstrap and collection access.
//!
//! # Responsibility
//! - Open and verify the SQLite-backed document store described by
//!   `StoreConfig`.
//! - Memoize one connection per `StoreClient` and expose collection views.
//!
//! # Invariants
//! - A connection is returned only after the liveness check succeeded.
//! - The configured collection table exists before any collection operation.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod client;
pub mod collection;
mod open;

pub use client::StoreClient;
pub use collection::{Collection, Document, DocumentFilter, DocumentId};
pub use open::{open_store, LIVENESS_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to reach or configure the store on first use.
#[derive(Debug)]
pub enum ConnectionError {
    /// A required setting was absent; carries the environment variable name.
    MissingSetting(&'static str),
    InvalidSetting {
        setting: &'static str,
        value: String,
    },
    Unreachable {
        endpoint: String,
        reason: String,
    },
    LivenessTimeout {
        endpoint: String,
        timeout_ms: u128,
        elapsed_ms: u128,
    },
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSetting(setting) => write!(f, "missing store setting `{setting}`"),
            Self::InvalidSetting { setting, value } => {
                write!(f, "invalid value `{value}` for store setting `{setting}`")
            }
            Self::Unreachable { endpoint, reason } => {
                write!(f, "store at `{endpoint}` is unreachable: {reason}")
            }
            Self::LivenessTimeout {
                endpoint,
                timeout_ms,
                elapsed_ms,
            } => write!(
                f,
                "store at `{endpoint}` did not answer within {timeout_ms} ms (took {elapsed_ms} ms)"
            ),
        }
    }
}

impl Error for ConnectionError {}

#[derive(Debug)]
pub enum DbError {
    Connection(ConnectionError),
    Sqlite(rusqlite::Error),
    /// A document could not be encoded to or decoded from JSON.
    Document(serde_json::Error),
    /// A document or field path does not have the shape the store requires.
    InvalidDocument(String),
}

impl DbError {
    /// Returns whether this error means the store could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "invalid document: {err}"),
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::InvalidDocument(_) => None,
        }
    }
}

impl From<ConnectionError> for DbError {
    fn from(value: ConnectionError) -> Self {
        Self::Connection(value)
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(value: serde_json::Error) -> Self {
        Self::Document(value)
    }
}
