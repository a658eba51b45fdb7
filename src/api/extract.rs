//! Request Extractors
//!
//! Wrappers around axum's extractors that report rejections as
//! [`ApiError`] so every failure shares the `{error}` body, plus the bearer
//! token extractor used by protected routes.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::Claims;

/// JSON body extractor with `{error}` rejections
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor with `{error}` rejections
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor with `{error}` rejections
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The caller's identity, taken from a verified bearer token.
///
/// The payload is trusted as-is for the rest of the request; the user
/// table is not consulted.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Auth("Missing auth token".to_string()))?;

        let claims = state.tokens.verify(token)?;
        Ok(AuthUser(claims))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
