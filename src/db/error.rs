//! Database error types
//!
//! Defines all errors that can occur in the database layer.

use rusqlite::ffi;
use thiserror::Error;

/// Errors that can occur in the database layer
#[derive(Error, Debug)]
pub enum DbError {
    /// A UNIQUE constraint rejected the write
    #[error("Uniqueness violation: {0}")]
    Conflict(String),

    /// A FOREIGN KEY constraint rejected the write (referenced row missing)
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// Any other SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// I/O operation failed (opening files, creating directories)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog seed file could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let constraint = match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Some((
                    e.extended_code,
                    msg.clone().unwrap_or_else(|| e.to_string()),
                ))
            }
            _ => None,
        };

        match constraint {
            Some((ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY, detail)) => {
                DbError::Conflict(detail)
            }
            Some((ffi::SQLITE_CONSTRAINT_FOREIGNKEY, detail)) => DbError::MissingReference(detail),
            _ => DbError::Sqlite(err),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;
