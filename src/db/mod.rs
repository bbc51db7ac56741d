//! Database operations for members and diary entries.
//!
//! This module provides SQLite database operations for the credential store and
//! the diary store. It uses connection pooling via r2d2 so each request checks
//! out its own connection and hands it back on drop, whatever the exit path.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `members`: Member insert and lookup
//! - `entries`: Diary entry insert, query and delete
//!
//! # Example
//!
//! ```no_run
//! use emodiary::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/emodiary.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod entries;
pub mod members;
pub mod schema;

use crate::constants::{DB_BUSY_TIMEOUT_MS, DB_POOL_MAX_SIZE};
use crate::errors::{AppResult, DatabaseError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates a SQLite database.
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(DB_POOL_MAX_SIZE)
            .connection_customizer(Box::new(SqliteConfig))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Runs `f` inside a transaction on a freshly checked-out connection.
    ///
    /// Commits when `f` returns `Ok` and rolls back when it returns `Err`, so
    /// every call ends in exactly one of the two. The connection goes back to
    /// the pool when this returns, on either path.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a `DatabaseError` if the transaction
    /// cannot be started or committed.
    pub fn with_transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;

        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(DatabaseError::Sqlite)?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed: {}", rollback_err);
                }
                debug!("Transaction rolled back: {}", err);
                Err(err)
            }
        }
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Connection customizer applied to every pooled connection.
///
/// `foreign_keys` is a per-connection setting in SQLite, so it has to be set on
/// acquire rather than once at schema creation.
#[derive(Debug)]
struct SqliteConfig;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SqliteConfig {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(DB_BUSY_TIMEOUT_MS))?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}
