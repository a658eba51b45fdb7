//! Auth Routes
//!
//! - POST /api/auth/register - Create an account, returns token + user
//! - POST /api/auth/login - Exchange credentials for token + user
//! - GET /api/auth/me - Echo the decoded token payload

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, AuthUser};
use crate::api::state::AppState;
use crate::auth::{hash_password, verify_password};
use crate::db::DbError;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (name, email, password) = match (
        non_blank(req.name),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) {
        (Some(name), Some(email), Some(password)) => (name, normalize_email(&email), password),
        _ => {
            return Err(ApiError::Validation(
                "name, email, password are required".to_string(),
            ))
        }
    };

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("Failed to register", e))??;

    let user = match state.db.create_user(&name, &email, &password_hash).await {
        Ok(user) => user.public(),
        Err(DbError::Conflict(_)) => {
            return Err(ApiError::Conflict("Email already exists".to_string()))
        }
        Err(e) => return Err(ApiError::internal("Failed to register", e)),
    };

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same response.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = match (non_blank(req.email), req.password.filter(|p| !p.is_empty())) {
        (Some(email), Some(password)) => (normalize_email(&email), password),
        _ => {
            return Err(ApiError::Validation(
                "email and password are required".to_string(),
            ))
        }
    };

    let record = state
        .db
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal("Failed to login", e))?
        .ok_or_else(|| ApiError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let stored_hash = record.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal("Failed to login", e))??;

    if !matches {
        tracing::debug!(user_id = record.id, "Login rejected");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let user = record.public();
    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(AuthUser(claims): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: claims.user(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Ann ".into())), Some("Ann".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
