//! Book Finder REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/auth/register` - Create an account
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `GET /api/auth/me` - Decoded token payload (bearer)
//!
//! ## Books
//! - `GET /api/books` - Full catalog
//! - `GET /api/books/search` - Filter by `q`, `author`, `genre`
//!
//! ## Favorites (bearer)
//! - `GET /api/books/favorites` - Caller's favorites
//! - `POST /api/books/favorites` - Add a favorite
//! - `DELETE /api/books/favorites/:id` - Remove a favorite
//!
//! ## Reviews
//! - `GET /api/books/:id/reviews` - Reviews and rating summary for a book
//! - `POST /api/books/:id/reviews` - Create or overwrite own review (bearer)
//! - `GET /api/reviews/summary?ids=1,2` - Bulk rating summaries
//! - `DELETE /api/reviews/:id` - Delete own review (bearer)
//!
//! ## Health
//! - `GET /` - Liveness message
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use bookfinder::api::{serve, AppState};
//! use bookfinder::auth::TokenIssuer;
//! use bookfinder::config::ServerConfig;
//! use bookfinder::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::open("bookfinder.db")?);
//!     let tokens = Arc::new(TokenIssuer::new(b"change-me", 7));
//!     let config = ServerConfig::default();
//!
//!     let state = AppState::new(db, tokens, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{HeaderValue, Uri},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        // Book routes
        .route("/books", get(routes::books::list_books))
        .route("/books/search", get(routes::books::search_books))
        // Favorite routes
        .route(
            "/books/favorites",
            get(routes::favorites::list_favorites).post(routes::favorites::add_favorite),
        )
        .route(
            "/books/favorites/:id",
            delete(routes::favorites::remove_favorite),
        )
        // Review routes
        .route(
            "/books/:id/reviews",
            get(routes::reviews::book_reviews).post(routes::reviews::save_review),
        )
        .route("/reviews/summary", get(routes::reviews::review_summaries))
        .route("/reviews/:id", delete(routes::reviews::delete_review));

    let cors = cors_layer(&state.config.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::full_health))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin when the list is empty, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Book Finder API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Book Finder API shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use crate::db::{sample_books, Database, PublicUser};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const SECRET: &[u8] = b"test-secret";

    async fn create_test_app() -> Router {
        let db = Database::open_in_memory().unwrap();
        db.insert_books(&sample_books()).await.unwrap();

        let state = AppState::new(
            Arc::new(db),
            Arc::new(TokenIssuer::new(SECRET, 7)),
            ServerConfig::default(),
        );
        build_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    async fn register(app: &Router, name: &str, email: &str) -> (String, i64) {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": name, "email": email, "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Backend is running");

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_body() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let app = create_test_app().await;
        register(&app, "Ann", "ann@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": "Ann 2", "email": "  ANN@example.com ", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email already exists");
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": "Ann", "email": "ann@example.com", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name, email, password are required");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let app = create_test_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_token_matches_user() {
        let app = create_test_app().await;
        let (_, user_id) = register(&app, "Ann", "ann@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "Ann@Example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"].as_i64(), Some(user_id));

        let token = body["token"].as_str().unwrap();
        let claims = TokenIssuer::new(SECRET, 7).verify(token).unwrap();
        assert_eq!(claims.id, user_id);

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "ann@example.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = create_test_app().await;
        register(&app, "Ann", "ann@example.com").await;

        let (status, wrong_password) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ann@example.com", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, unknown_email) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "bob@example.com", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(unknown_email["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bad_tokens() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/books/favorites", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing auth token");

        let forged = TokenIssuer::new(b"another-secret", 7)
            .issue(&PublicUser {
                id: 1,
                name: "Mallory".to_string(),
                email: "m@example.com".to_string(),
            })
            .unwrap();
        let (status, body) =
            send(&app, Method::GET, "/api/auth/me", Some(&forged), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_search() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/books/search", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Provide at least one query parameter: q, author, or genre"
        );

        let (status, body) =
            send(&app, Method::GET, "/api/books/search?genre=Fantasy", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), 3);
        assert!(books.iter().all(|b| b["genre"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("fantasy")));

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/books/search?author=le%20guin&genre=science",
            None,
            None,
        )
        .await;
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["title"], "The Left Hand of Darkness");
        assert!(books[0]["desc"].is_string());
    }

    #[tokio::test]
    async fn test_list_books() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/books", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), sample_books().len());
    }

    #[tokio::test]
    async fn test_favorites_flow() {
        let app = create_test_app().await;
        let (ann, _) = register(&app, "Ann", "ann@example.com").await;
        let (bob, _) = register(&app, "Bob", "bob@example.com").await;

        let add = json!({"book_id": 2});
        let (status, body) =
            send(&app, Method::POST, "/api/books/favorites", Some(&ann), Some(add.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Added to favorites");

        let (status, body) =
            send(&app, Method::POST, "/api/books/favorites", Some(&ann), Some(add)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Book is already in favorites");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books/favorites",
            Some(&ann),
            Some(json!({"book_id": 999})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Book not found");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books/favorites",
            Some(&ann),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "book_id is required");

        let (status, body) =
            send(&app, Method::GET, "/api/books/favorites", Some(&ann), None).await;
        assert_eq!(status, StatusCode::OK);
        let favorites = body.as_array().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0]["title"], "Dune");
        let favorite_id = favorites[0]["favorite_id"].as_i64().unwrap();

        let uri = format!("/api/books/favorites/{}", favorite_id);
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Favorite not found");

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&ann), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Removed from favorites");

        let (_, body) = send(&app, Method::GET, "/api/books/favorites", Some(&ann), None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_path_id() {
        let app = create_test_app().await;
        let (ann, _) = register(&app, "Ann", "ann@example.com").await;

        let (status, body) =
            send(&app, Method::DELETE, "/api/books/favorites/abc", Some(&ann), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_review_upsert_and_summary() {
        let app = create_test_app().await;
        let (ann, ann_id) = register(&app, "Ann", "ann@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books/1/reviews",
            Some(&ann),
            Some(json!({"rating": 6})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "rating must be an integer 1–5");

        let review = json!({"rating": 4, "comment": "Lovely"});
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books/1/reviews",
            Some(&ann),
            Some(review.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Review saved");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        send(&app, Method::POST, "/api/books/1/reviews", Some(&ann), Some(review)).await;

        let (status, body) = send(&app, Method::GET, "/api/books/1/reviews", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let reviews = body["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["rating"], 4);
        assert_eq!(reviews[0]["user_id"].as_i64(), Some(ann_id));
        assert_eq!(reviews[0]["user_name"], "Ann");
        assert!(
            reviews[0]["updated_at"].as_str().unwrap()
                > reviews[0]["created_at"].as_str().unwrap()
        );
        assert_eq!(body["summary"]["avg_rating"], 4.0);
        assert_eq!(body["summary"]["review_count"], 1);

        let (_, body) = send(&app, Method::GET, "/api/books/2/reviews", None, None).await;
        assert_eq!(body["summary"]["avg_rating"], Value::Null);
        assert_eq!(body["summary"]["review_count"], 0);
        assert!(body["reviews"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_for_missing_book() {
        let app = create_test_app().await;
        let (ann, _) = register(&app, "Ann", "ann@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books/999/reviews",
            Some(&ann),
            Some(json!({"rating": "3"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Book not found");
    }

    #[tokio::test]
    async fn test_bulk_summary() {
        let app = create_test_app().await;
        let (ann, _) = register(&app, "Ann", "ann@example.com").await;
        let (bob, _) = register(&app, "Bob", "bob@example.com").await;

        let (status, body) = send(&app, Method::GET, "/api/reviews/summary", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        for (token, rating) in [(&ann, 5), (&bob, 4)] {
            send(
                &app,
                Method::POST,
                "/api/books/3/reviews",
                Some(token),
                Some(json!({"rating": rating})),
            )
            .await;
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/reviews/summary?ids=3,4,abc",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["3"]["avg_rating"], 4.5);
        assert_eq!(body["3"]["review_count"], 2);
        assert_eq!(body["4"], json!({"avg_rating": null, "review_count": 0}));
        assert_eq!(body.as_object().map(|m| m.len()), Some(2));

        let (status, body) = send(&app, Method::GET, "/api/reviews/summary?ids=1,2", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["1"]["review_count"], 0);
        assert_eq!(body["2"]["avg_rating"], Value::Null);
    }

    #[tokio::test]
    async fn test_delete_review_ownership() {
        let app = create_test_app().await;
        let (ann, _) = register(&app, "Ann", "ann@example.com").await;
        let (bob, _) = register(&app, "Bob", "bob@example.com").await;

        send(
            &app,
            Method::POST,
            "/api/books/1/reviews",
            Some(&ann),
            Some(json!({"rating": 2})),
        )
        .await;
        let (_, body) = send(&app, Method::GET, "/api/books/1/reviews", None, None).await;
        let review_id = body["reviews"][0]["id"].as_i64().unwrap();
        let uri = format!("/api/reviews/{}", review_id);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Review not found");

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&ann), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Review deleted");
    }

    async fn preflight(app: Router, origin: &str) -> Option<String> {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/books")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    async fn app_with_origins(origins: &[&str]) -> Router {
        let db = Database::open_in_memory().unwrap();
        let config = ServerConfig {
            cors_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..ServerConfig::default()
        };
        build_router(AppState::new(
            Arc::new(db),
            Arc::new(TokenIssuer::new(SECRET, 7)),
            config,
        ))
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let app = app_with_origins(&[]).await;
        assert_eq!(preflight(app, "http://elsewhere.test").await.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_cors_configured_origins() {
        let origins = ["http://localhost:3000", "bad\norigin"];

        let app = app_with_origins(&origins).await;
        assert_eq!(
            preflight(app, "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );

        let app = app_with_origins(&origins).await;
        assert_eq!(preflight(app, "http://evil.test").await, None);
    }
}
