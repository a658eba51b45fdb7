//! HTTP API Client
//!
//! Functions for communicating with the Book Finder REST API. Calls that
//! need an account take the [`Session`] explicitly and send its token as a
//! bearer token.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::state::session::{Session, User};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8800";

const API_URL_KEY: &str = "bookfinder_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    url.trim_end_matches('/').to_string()
}

// ============ Response Types ============

/// A catalog book
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub author: String,
    pub genre: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// A favorite: the favorite's own id plus the book fields
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct FavoriteBook {
    pub favorite_id: i64,
    #[serde(flatten)]
    pub book: Book,
}

/// Average rating and count; `avg_rating` is `None` when there are no reviews
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize)]
pub struct RatingSummary {
    pub avg_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Review {
    pub id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: i64,
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct BookReviews {
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}

#[derive(Debug, serde::Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// A failed call: HTTP status (0 for network failures) and the server's message
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
}

impl ApiFailure {
    fn network(err: impl std::fmt::Display) -> Self {
        Self {
            status: 0,
            message: format!("Network error: {}", err),
        }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub type ApiResult<T> = Result<T, ApiFailure>;

// ============ Search Query ============

/// Search form values; blank fields are dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl SearchQuery {
    pub fn new(q: &str, author: &str, genre: &str) -> Self {
        fn clean(value: &str) -> Option<String> {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            q: clean(q),
            author: clean(author),
            genre: clean(genre),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.author.is_none() && self.genre.is_none()
    }

    /// `q=..&author=..&genre=..` with only the present fields, percent-encoded
    pub fn to_query_string(&self) -> String {
        [("q", &self.q), ("author", &self.author), ("genre", &self.genre)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ============ API Functions ============

fn authorized(builder: RequestBuilder, session: &Session) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {}", session.token))
}

/// Decode a 2xx body, or turn the `{error}` body into an [`ApiFailure`]
async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    if !response.ok() {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));
        return Err(ApiFailure { status, message });
    }

    response.json().await.map_err(|e| ApiFailure {
        status: 0,
        message: format!("Parse error: {}", e),
    })
}

/// Check a response for success and discard its body
async fn read_ok(response: Response) -> ApiResult<()> {
    read_json::<serde_json::Value>(response).await.map(|_| ())
}

/// Create an account
pub async fn register(name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
    let response = Request::post(&format!("{}/api/auth/register", get_api_base()))
        .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
        .map_err(ApiFailure::network)?
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Exchange credentials for a session token
pub async fn login(email: &str, password: &str) -> ApiResult<AuthResponse> {
    let response = Request::post(&format!("{}/api/auth/login", get_api_base()))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .map_err(ApiFailure::network)?
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Fetch the whole catalog
pub async fn fetch_books() -> ApiResult<Vec<Book>> {
    let response = Request::get(&format!("{}/api/books", get_api_base()))
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Search the catalog
pub async fn search_books(query: &SearchQuery) -> ApiResult<Vec<Book>> {
    let url = format!(
        "{}/api/books/search?{}",
        get_api_base(),
        query.to_query_string()
    );

    let response = Request::get(&url)
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Fetch the session user's favorites
pub async fn fetch_favorites(session: &Session) -> ApiResult<Vec<FavoriteBook>> {
    let builder = Request::get(&format!("{}/api/books/favorites", get_api_base()));

    let response = authorized(builder, session)
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Add a book to the session user's favorites
pub async fn add_favorite(session: &Session, book_id: i64) -> ApiResult<()> {
    let builder = Request::post(&format!("{}/api/books/favorites", get_api_base()));

    let response = authorized(builder, session)
        .json(&serde_json::json!({ "book_id": book_id }))
        .map_err(ApiFailure::network)?
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_ok(response).await
}

/// Remove one of the session user's favorites
pub async fn remove_favorite(session: &Session, favorite_id: i64) -> ApiResult<()> {
    let builder = Request::delete(&format!(
        "{}/api/books/favorites/{}",
        get_api_base(),
        favorite_id
    ));

    let response = authorized(builder, session)
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_ok(response).await
}

/// Rating summaries keyed by book id; books without reviews are absent
pub async fn fetch_review_summary(book_ids: &[i64]) -> ApiResult<HashMap<i64, RatingSummary>> {
    let ids = book_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let response = Request::get(&format!(
        "{}/api/reviews/summary?ids={}",
        get_api_base(),
        ids
    ))
    .send()
    .await
    .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Reviews and summary for one book
pub async fn fetch_book_reviews(book_id: i64) -> ApiResult<BookReviews> {
    let response = Request::get(&format!("{}/api/books/{}/reviews", get_api_base(), book_id))
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_json(response).await
}

/// Create or overwrite the session user's review of a book
pub async fn save_review(
    session: &Session,
    book_id: i64,
    rating: u8,
    comment: &str,
) -> ApiResult<()> {
    let builder = Request::post(&format!("{}/api/books/{}/reviews", get_api_base(), book_id));

    let response = authorized(builder, session)
        .json(&serde_json::json!({ "rating": rating, "comment": comment }))
        .map_err(ApiFailure::network)?
        .send()
        .await
        .map_err(ApiFailure::network)?;

    read_ok(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_drops_blank_fields() {
        let query = SearchQuery::new("  ", " Tolkien ", "");
        assert!(!query.is_empty());
        assert_eq!(query.author.as_deref(), Some("Tolkien"));
        assert_eq!(query.to_query_string(), "author=Tolkien");

        assert!(SearchQuery::new("", " ", "").is_empty());
    }

    #[test]
    fn test_query_string_encoding() {
        let query = SearchQuery::new("100% wolf", "Le Guin", "sci-fi & fantasy");
        assert_eq!(
            query.to_query_string(),
            "q=100%25%20wolf&author=Le%20Guin&genre=sci-fi%20%26%20fantasy"
        );

        let query = SearchQuery::new("", "Émile Zola", "");
        assert_eq!(query.to_query_string(), "author=%C3%89mile%20Zola");
    }

    #[test]
    fn test_summary_map_deserializes_string_keys() {
        let map: HashMap<i64, RatingSummary> =
            serde_json::from_str(r#"{"3": {"avg_rating": 4.5, "review_count": 2}}"#).unwrap();
        assert_eq!(map[&3].avg_rating, Some(4.5));
        assert!(map.get(&4).is_none());
    }

    #[test]
    fn test_favorite_flattens_book() {
        let fav: FavoriteBook = serde_json::from_str(
            r#"{"favorite_id": 9, "id": 2, "title": "Dune", "desc": "Sand",
                "author": "Frank Herbert", "genre": "Science Fiction",
                "publication_year": 1965, "price": null, "cover": null}"#,
        )
        .unwrap();
        assert_eq!(fav.favorite_id, 9);
        assert_eq!(fav.book.title, "Dune");
    }
}
