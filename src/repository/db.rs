//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations, and the per-table change bus
//! that live queries react to.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::{broadcast, Mutex};

use crate::domain::{DomainError, DomainResult};

/// Buffered change events per subscriber; a lagged subscriber coalesces the
/// missed events into one refresh
const CHANGE_BUS_CAPACITY: usize = 16;

/// Tables a write can touch; the unit of change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Categories,
    CategoryAssignments,
}

/// Shared handle to the underlying store
///
/// Cheap to clone; every clone refers to the same connection and the same
/// change bus.
#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Option<Connection>>>,
    changes: broadcast::Sender<Table>,
}

impl Store {
    /// Subscribe to the per-table change feed
    pub fn subscribe_changes(&self) -> broadcast::Receiver<Table> {
        self.changes.subscribe()
    }

    /// Publish a change event after a committed write
    pub(crate) fn notify(&self, table: Table) {
        // Nobody listening yet is fine
        let _ = self.changes.send(table);
    }

    /// Close the store; subsequent operations fail and live streams terminate
    /// on their next refresh
    pub async fn close(&self) {
        let mut guard = self.conn.lock().await;
        *guard = None;
        log::info!("store closed");
    }
}

/// Initialize database with path
pub fn init_db(db_path: &Path) -> DomainResult<Store> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Storage(format!("Failed to open db: {}", e)))?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(db_err)?;

    run_migrations(&conn)?;
    log::info!("database ready at {}", db_path.display());

    let (changes, _) = broadcast::channel(CHANGE_BUS_CAPACITY);
    Ok(Store {
        conn: Arc::new(Mutex::new(Some(conn))),
        changes,
    })
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            \"order\" INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .map_err(db_err)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS category_assignments (
            item_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (item_id, category_id),
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(db_err)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_category
            ON category_assignments(category_id)",
        [],
    )
    .map_err(db_err)?;

    log::debug!("migrations applied");
    Ok(())
}

/// Classify a store error into the domain taxonomy
pub(crate) fn db_err(e: rusqlite::Error) -> DomainError {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DomainError::Constraint(msg.unwrap_or_else(|| err.to_string()))
        }
        other => DomainError::Storage(other.to_string()),
    }
}
