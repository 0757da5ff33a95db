//! Store connection settings.
//!
//! # Responsibility
//! - Carry the three externally supplied settings (endpoint URI, database
//!   name, collection name) from the CLI/environment into core.
//! - Resolve them into a concrete store location at connection time.
//!
//! # Invariants
//! - Settings are only validated when a connection is first requested, so a
//!   missing value surfaces as a connection-time failure.
//! - Database and collection names are safe to embed as SQL identifiers and
//!   file names once resolved.

use crate::db::ConnectionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Environment variable holding the store endpoint URI.
pub const ENV_STORE_URI: &str = "STORE_URI";
/// Environment variable holding the database name.
pub const ENV_DB_NAME: &str = "DB_NAME";
/// Environment variable holding the collection name.
pub const ENV_COLLECTION_NAME: &str = "COLLECTION_NAME";

const MEMORY_ENDPOINT: &str = "memory://";
const DATABASE_FILE_EXTENSION: &str = "sqlite3";

static DATABASE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("database name pattern is valid"));
static COLLECTION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("collection name pattern is valid")
});

/// Raw, possibly incomplete, store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// `memory://`, `file:///abs/dir`, `sqlite:///abs/dir`, or a bare directory path.
    pub uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

/// Where the store lives once settings are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-private in-memory store.
    Memory,
    /// Database file inside an existing directory.
    File(PathBuf),
}

/// Fully validated settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub location: StoreLocation,
    pub database: String,
    pub collection: String,
}

impl StoreConfig {
    /// Builds settings for an in-memory store, mostly for tests and demos.
    pub fn in_memory(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            uri: Some(MEMORY_ENDPOINT.to_string()),
            database: Some(database.into()),
            collection: Some(collection.into()),
        }
    }

    /// Validates every setting and computes the store location.
    ///
    /// # Errors
    /// - `MissingSetting` when any setting is absent or blank.
    /// - `InvalidSetting` when a name contains characters outside the
    ///   allowed identifier set or the URI scheme is unsupported.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConnectionError> {
        let endpoint = required(self.uri.as_deref(), ENV_STORE_URI)?;
        let database = required(self.database.as_deref(), ENV_DB_NAME)?;
        let collection = required(self.collection.as_deref(), ENV_COLLECTION_NAME)?;

        if !DATABASE_NAME_RE.is_match(database) {
            return Err(ConnectionError::InvalidSetting {
                setting: ENV_DB_NAME,
                value: database.to_string(),
            });
        }
        if !COLLECTION_NAME_RE.is_match(collection) {
            return Err(ConnectionError::InvalidSetting {
                setting: ENV_COLLECTION_NAME,
                value: collection.to_string(),
            });
        }

        let location = match parse_endpoint(endpoint)? {
            None => StoreLocation::Memory,
            Some(dir) => {
                StoreLocation::File(dir.join(format!("{database}.{DATABASE_FILE_EXTENSION}")))
            }
        };

        Ok(ResolvedConfig {
            endpoint: endpoint.to_string(),
            location,
            database: database.to_string(),
            collection: collection.to_string(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, setting: &'static str) -> Result<&'a str, ConnectionError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConnectionError::MissingSetting(setting)),
    }
}

/// Returns `None` for the in-memory endpoint, otherwise the store directory.
fn parse_endpoint(endpoint: &str) -> Result<Option<PathBuf>, ConnectionError> {
    if endpoint == MEMORY_ENDPOINT || endpoint == "memory:" {
        return Ok(None);
    }

    let path = if let Some(rest) = endpoint.strip_prefix("file://") {
        rest
    } else if let Some(rest) = endpoint.strip_prefix("sqlite://") {
        rest
    } else if endpoint.contains("://") {
        return Err(ConnectionError::InvalidSetting {
            setting: ENV_STORE_URI,
            value: endpoint.to_string(),
        });
    } else {
        endpoint
    };

    if path.is_empty() {
        return Err(ConnectionError::InvalidSetting {
            setting: ENV_STORE_URI,
            value: endpoint.to_string(),
        });
    }

    Ok(Some(PathBuf::from(path)))
}
