//! # Book Finder
//!
//! A small full-stack Rust application for discovering books, keeping a
//! personal favorites list, and rating and reviewing titles.
//!
//! ## Features
//!
//! - **Catalog search**: case-insensitive substring search by keyword, author, and genre
//! - **Accounts**: Argon2 password hashing and HS256 bearer tokens
//! - **Favorites**: per-user list, one entry per book
//! - **Reviews**: one review per user and book, last write wins, with rating summaries
//!
//! ## Modules
//!
//! - [`db`]: SQLite persistence
//! - [`auth`]: password hashing and session tokens
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookfinder::db::{Database, SearchFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("bookfinder.db")?;
//!
//!     let filter = SearchFilter::new(None, None, Some("fantasy".to_string()));
//!     for book in db.search_books(&filter).await? {
//!         println!("{} by {}", book.title, book.author);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use auth::{AuthError, Claims, TokenIssuer};

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};

pub use db::{
    Book, BookReviews, Database, DbError, DbResult, FavoriteBook, PublicUser, RatingSummary,
    Review, SearchFilter,
};
