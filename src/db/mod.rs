// src/db/mod.rs

//! Database access for Ladle
//!
//! One SQLite connection is opened at process start and shared by every
//! request handler. Handlers run their queries on the blocking thread pool
//! through [`Database::call`] so the async runtime is never stalled by
//! SQLite work.

pub mod models;
pub mod schema;

use crate::error::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Open a connection to the Ladle database and apply pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::migrate(&conn)?;
    Ok(conn)
}

/// Shared handle to the single SQLite connection.
///
/// Cloning is cheap; all clones serialize access through the same lock.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database at `path`, migrating it to the current schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the shared connection on the blocking thread pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| crate::Error::Other(format!("Database task failed: {}", e)))?
    }

    /// Synchronous access for tests and the `init` command.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard = self.conn.lock();
        f(&mut guard)
    }
}
