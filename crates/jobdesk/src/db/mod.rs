//! SQLite storage for the document backend.
//!
//! One table, `documents`, keyed by `(collection, key)` with the document
//! body stored as JSON text. See [`document_repo`] for the queries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction};

pub mod document_repo;
pub mod error;
pub mod migrations;

pub use error::DatabaseError;

/// Shared handle to a single migrated connection.
///
/// Clones refer to the same connection; callers take turns through the
/// inner mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens or creates the file at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self::prepare(conn, Some(path.to_path_buf()))?;
        log::info!("Document database ready at {}", path.display());
        Ok(db)
    }

    /// A private in-memory database, gone when the last clone drops.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open_in_memory()?, None)
    }

    fn prepare(mut conn: Connection, path: Option<PathBuf>) -> Result<Self, DatabaseError> {
        migrations::run_all(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` in a transaction that commits only if `f` succeeds.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(DatabaseError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }
}

/// `~/.jobdesk/data/jobdesk.db`, if a home directory is known.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".jobdesk").join("data").join("jobdesk.db"))
}
