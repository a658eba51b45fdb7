//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;
use crate::db::Database;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The single shared database handle
    pub db: Arc<Database>,
    /// Signs and verifies session tokens
    pub tokens: Arc<TokenIssuer>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Arc<Database>, tokens: Arc<TokenIssuer>, config: ServerConfig) -> Self {
        Self {
            db,
            tokens,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
