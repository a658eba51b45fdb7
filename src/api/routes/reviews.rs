//! Review Routes
//!
//! - GET /api/books/:id/reviews - Reviews for a book plus its rating summary
//! - POST /api/books/:id/reviews - Create or overwrite the caller's review
//! - GET /api/reviews/summary?ids=1,2,3 - Rating summaries for many books
//! - DELETE /api/reviews/:id - Delete one of the caller's reviews

use axum::{extract::State, http::StatusCode, Json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::{as_integer, MessageResponse, ReviewRequest, SummaryParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::api::state::AppState;
use crate::db::{BookReviews, DbError, RatingSummary};

/// Maximum review comment length, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// GET /api/books/:id/reviews
pub async fn book_reviews(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> ApiResult<Json<BookReviews>> {
    let reviews = state
        .db
        .book_reviews(book_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load reviews", e))?;

    Ok(Json(reviews))
}

/// GET /api/reviews/summary
///
/// Keyed by book id; books without reviews map to `{null, 0}`.
pub async fn review_summaries(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SummaryParams>,
) -> ApiResult<Json<BTreeMap<i64, RatingSummary>>> {
    let ids = params.book_ids();

    let summaries = state
        .db
        .rating_summaries(&ids)
        .await
        .map_err(|e| ApiError::internal("Failed to load review summary", e))?;

    Ok(Json(summaries))
}

/// POST /api/books/:id/reviews
///
/// Last write wins per (user, book).
pub async fn save_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(book_id): ApiPath<i64>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let rating = validate_rating(&req)?;
    let comment = validate_comment(req.comment.as_deref())?;

    match state
        .db
        .upsert_review(user.id(), book_id, rating, comment)
        .await
    {
        Ok(()) => {
            tracing::info!(user_id = user.id(), book_id, rating, "Saved review");
            Ok((StatusCode::CREATED, Json(MessageResponse::new("Review saved"))))
        }
        Err(DbError::MissingReference(_)) => Err(ApiError::NotFound("Book not found".to_string())),
        Err(e) => Err(ApiError::internal("Failed to save review", e)),
    }
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(review_id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = state
        .db
        .delete_review(user.id(), review_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete review", e))?;

    if !deleted {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }

    tracing::info!(user_id = user.id(), review_id, "Deleted review");
    Ok(Json(MessageResponse::new("Review deleted")))
}

fn validate_rating(req: &ReviewRequest) -> ApiResult<i64> {
    req.rating
        .as_ref()
        .and_then(as_integer)
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| ApiError::Validation("rating must be an integer 1–5".to_string()))
}

/// Empty comments are stored as null
fn validate_comment(comment: Option<&str>) -> ApiResult<Option<&str>> {
    match comment {
        Some(c) if c.chars().count() > MAX_COMMENT_CHARS => Err(ApiError::Validation(format!(
            "comment must be <= {} characters",
            MAX_COMMENT_CHARS
        ))),
        Some("") | None => Ok(None),
        Some(c) => Ok(Some(c)),
    }
}
