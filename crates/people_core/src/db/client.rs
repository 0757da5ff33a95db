//! Lazily connected store handle.
//!
//! # Responsibility
//! - Own the store settings and, after first use, the single connection.
//! - Hand out collection views bound to that connection.
//!
//! # Invariants
//! - At most one connection is established per client.
//! - A failed first attempt is not memoized; the next call tries again.

use super::collection::Collection;
use super::open::open_store;
use super::DbResult;
use crate::config::StoreConfig;
use once_cell::unsync::OnceCell;
use rusqlite::Connection;

struct Connected {
    conn: Connection,
    collection: String,
}

/// Connection context created by the entry point and passed to repositories.
pub struct StoreClient {
    config: StoreConfig,
    connected: OnceCell<Connected>,
}

impl StoreClient {
    /// Records settings without touching the store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            connected: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get().is_some()
    }

    /// Returns the live connection, establishing it on first call.
    ///
    /// # Errors
    /// - `DbError::Connection` when settings are missing/invalid or the
    ///   store fails its liveness check.
    pub fn handle(&self) -> DbResult<&Connection> {
        Ok(&self.connected()?.conn)
    }

    /// Returns a view of the configured collection.
    pub fn collection(&self) -> DbResult<Collection<'_>> {
        let connected = self.connected()?;
        Ok(Collection::new(&connected.conn, &connected.collection))
    }

    fn connected(&self) -> DbResult<&Connected> {
        self.connected.get_or_try_init(|| -> DbResult<Connected> {
            let resolved = self.config.resolve()?;
            let conn = open_store(&resolved)?;
            Ok(Connected {
                conn,
                collection: resolved.collection,
            })
        })
    }
}
