//! Book Finder Database
//!
//! SQLite-backed persistence for users, books, favorites, and reviews.
//!
//! # Components
//!
//! - [`Database`]: owns the single shared connection
//! - [`models`]: row types returned by queries
//! - [`DbError`]: error classification (uniqueness, missing reference, other)
//!
//! Every query is one parameterized statement executed while holding the
//! connection lock, so requests are serialized at the database. The
//! two-statement review summary read is not atomic against concurrent writes.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookfinder::db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("bookfinder.db")?;
//!     let books = db.list_books().await?;
//!     println!("{} books in catalog", books.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;

mod books;
mod favorites;
mod reviews;
mod users;

pub use books::SearchFilter;
#[cfg(test)]
pub(crate) use books::sample_books;
pub use error::{DbError, DbResult};
pub use models::{
    Book, BookReviews, FavoriteBook, NewBook, PublicUser, RatingSummary, Review, UserRecord,
};

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tokio::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS books (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    author           TEXT NOT NULL,
    genre            TEXT NOT NULL,
    publication_year INTEGER,
    price            REAL,
    cover            TEXT
);

CREATE TABLE IF NOT EXISTS favorites (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    book_id    INTEGER NOT NULL REFERENCES books(id),
    created_at TEXT NOT NULL,
    UNIQUE (user_id, book_id)
);

CREATE TABLE IF NOT EXISTS reviews (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    book_id    INTEGER NOT NULL REFERENCES books(id),
    rating     INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment    TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, book_id)
);

CREATE INDEX IF NOT EXISTS idx_reviews_book ON reviews(book_id);
";

/// Handle to the application database
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init(conn)
    }

    /// Open a private in-memory database (used by tests)
    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Cheap round-trip used by the health check
    pub async fn ping(&self) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

/// Current time as a fixed-width RFC 3339 string with millisecond precision
/// (text order == time order)
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.ping().await.unwrap();
        assert!(db.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("books.db");

        let db = Database::open(&path).unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.db");

        {
            let db = Database::open(&path).unwrap();
            db.create_user("Ann", "ann@example.com", "hash").await.unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.find_user_by_email("ann@example.com").await.unwrap().is_some());
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let a = now_timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = now_timestamp();
        assert!(a < b);
        assert!(a.ends_with('Z'));
        // 2024-01-01T00:00:00.000Z
        assert_eq!(a.len(), 24);
        assert_eq!(a.as_bytes()[19], b'.');
    }
}
