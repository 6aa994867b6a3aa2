use std::path::PathBuf;
use thiserror::Error;

/// Errors from the SQLite document backend.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot create database directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema step {version} ({name}) failed: {source}")]
    Migration {
        version: u32,
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A filter named a field that cannot be used in a JSON path.
    #[error("Invalid document field name: '{0}'")]
    InvalidField(String),

    /// A stored body was not a JSON object.
    #[error("Corrupt document '{collection}/{key}': {reason}")]
    CorruptDocument {
        collection: String,
        key: String,
        reason: String,
    },

    #[error("Database lock poisoned")]
    LockPoisoned,
}
