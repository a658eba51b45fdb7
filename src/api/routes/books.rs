//! Book Routes
//!
//! - GET /api/books - Full catalog listing
//! - GET /api/books/search - Filtered listing (`q`, `author`, `genre`)

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::SearchParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiQuery;
use crate::api::state::AppState;
use crate::db::{Book, SearchFilter};

/// GET /api/books
pub async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .db
        .list_books()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch books", e))?;

    Ok(Json(books))
}

/// GET /api/books/search
///
/// At least one of `q`, `author`, `genre` is required.
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Vec<Book>>> {
    let filter = SearchFilter::new(params.q, params.author, params.genre);

    if filter.is_empty() {
        return Err(ApiError::Validation(
            "Provide at least one query parameter: q, author, or genre".to_string(),
        ));
    }

    let books = state
        .db
        .search_books(&filter)
        .await
        .map_err(|e| ApiError::internal("Failed to search books", e))?;

    tracing::debug!(?filter, results = books.len(), "Book search");
    Ok(Json(books))
}
