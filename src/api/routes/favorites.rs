//! Favorite Routes
//!
//! All routes require a bearer token and act on the caller's favorites only.
//!
//! - GET /api/books/favorites - List favorites, newest first
//! - POST /api/books/favorites - Add `{book_id}`
//! - DELETE /api/books/favorites/:id - Remove one of the caller's favorites

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{as_integer, AddFavoriteRequest, MessageResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, AuthUser};
use crate::api::state::AppState;
use crate::db::{DbError, FavoriteBook};

/// GET /api/books/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<FavoriteBook>>> {
    let favorites = state
        .db
        .list_favorites(user.id())
        .await
        .map_err(|e| ApiError::internal("Failed to fetch favorites", e))?;

    Ok(Json(favorites))
}

/// POST /api/books/favorites
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<AddFavoriteRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let book_id = req
        .book_id
        .as_ref()
        .and_then(as_integer)
        .ok_or_else(|| ApiError::Validation("book_id is required".to_string()))?;

    match state.db.add_favorite(user.id(), book_id).await {
        Ok(favorite_id) => {
            tracing::info!(user_id = user.id(), book_id, favorite_id, "Added favorite");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("Added to favorites")),
            ))
        }
        Err(DbError::Conflict(_)) => Err(ApiError::Conflict(
            "Book is already in favorites".to_string(),
        )),
        Err(DbError::MissingReference(_)) => Err(ApiError::NotFound("Book not found".to_string())),
        Err(e) => Err(ApiError::internal("Failed to add favorite", e)),
    }
}

/// DELETE /api/books/favorites/:id
///
/// Another user's favorite is reported exactly like a missing one.
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(favorite_id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state
        .db
        .remove_favorite(user.id(), favorite_id)
        .await
        .map_err(|e| ApiError::internal("Failed to remove favorite", e))?;

    if !removed {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }

    tracing::info!(user_id = user.id(), favorite_id, "Removed favorite");
    Ok(Json(MessageResponse::new("Removed from favorites")))
}
