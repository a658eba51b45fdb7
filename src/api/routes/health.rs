//! Health Routes
//!
//! - GET / - Plain liveness message
//! - GET /health - Full health status with a database round-trip

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, MessageResponse};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Backend is running"))
}

/// GET /health
///
/// Returns 503 when the database does not answer.
pub async fn full_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let (status, overall) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(HealthResponse {
            status: overall.to_string(),
            database: if database_ok { "ok" } else { "error" }.to_string(),
            uptime_seconds: state.uptime_seconds(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_message() {
        let Json(body) = root().await;
        assert_eq!(body.message, "Backend is running");
    }
}
