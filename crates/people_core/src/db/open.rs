//! Store bootstrap for the SQLite-backed document store.
//!
//! # Responsibility
//! - Open file or in-memory stores from resolved settings.
//! - Verify the store answers within the liveness timeout.
//! - Register SQL helpers and create the configured collection.
//!
//! # Invariants
//! - File stores are only opened inside an existing directory.
//! - Returned connections have passed the liveness check.
//!
//! # See also
//! - `crate::logging` for the event line format.

use super::collection::{create_collection, register_functions};
use super::{ConnectionError, DbResult};
use crate::config::{ResolvedConfig, StoreLocation};
use log::{debug, error, info};
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Upper bound for the first-use liveness check; also the busy timeout.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_millis(5000);

/// Opens the store described by `config` and prepares its collection.
///
/// # Side effects
/// - Creates the database file inside an existing directory when missing.
/// - Creates the collection table when missing.
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - `ConnectionError::Unreachable` when the directory is missing or the
///   store cannot be opened/read.
/// - `ConnectionError::LivenessTimeout` when the liveness check is too slow.
pub fn open_store(config: &ResolvedConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = mode_label(&config.location);
    info!("event=db_open module=db status=start mode={mode}");

    let conn = match open_connection(config) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} collection={} duration_ms={}",
                config.collection,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn open_connection(config: &ResolvedConfig) -> Result<Connection, ConnectionError> {
    match &config.location {
        StoreLocation::Memory => {
            Connection::open_in_memory().map_err(|err| ConnectionError::Unreachable {
                endpoint: config.endpoint.clone(),
                reason: err.to_string(),
            })
        }
        StoreLocation::File(path) => {
            let dir_exists = path.parent().is_some_and(|dir| dir.is_dir());
            if !dir_exists {
                return Err(ConnectionError::Unreachable {
                    endpoint: config.endpoint.clone(),
                    reason: "store directory does not exist".to_string(),
                });
            }
            Connection::open(path).map_err(|err| ConnectionError::Unreachable {
                endpoint: config.endpoint.clone(),
                reason: err.to_string(),
            })
        }
    }
}

fn bootstrap_connection(conn: &Connection, config: &ResolvedConfig) -> DbResult<()> {
    conn.busy_timeout(LIVENESS_TIMEOUT)?;
    check_liveness(conn, config)?;
    register_functions(conn)?;
    create_collection(conn, &config.collection)?;
    Ok(())
}

fn check_liveness(conn: &Connection, config: &ResolvedConfig) -> Result<(), ConnectionError> {
    let started_at = Instant::now();
    // Reads the schema page, so an unreadable or foreign file fails here.
    let probe = conn.query_row("SELECT COUNT(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    });
    let elapsed = started_at.elapsed();

    if let Err(err) = probe {
        return Err(ConnectionError::Unreachable {
            endpoint: config.endpoint.clone(),
            reason: err.to_string(),
        });
    }
    if elapsed > LIVENESS_TIMEOUT {
        return Err(ConnectionError::LivenessTimeout {
            endpoint: config.endpoint.clone(),
            timeout_ms: LIVENESS_TIMEOUT.as_millis(),
            elapsed_ms: elapsed.as_millis(),
        });
    }

    debug!(
        "event=db_ping module=db status=ok duration_ms={}",
        elapsed.as_millis()
    );
    Ok(())
}

fn mode_label(location: &StoreLocation) -> &'static str {
    match location {
        StoreLocation::Memory => "memory",
        StoreLocation::File(_) => "file",
    }
}
