//! Global Application State
//!
//! Reactive state shared by every page, and the actions that change it.

use leptos::*;
use std::collections::HashMap;

use crate::api::{self, ApiFailure, Book, BookReviews, FavoriteBook, RatingSummary, SearchQuery};
use crate::state::session::{Session, SessionStore};

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Results of the last search
    pub search_results: RwSignal<Vec<Book>>,
    /// The session user's favorites
    pub favorites: RwSignal<Vec<FavoriteBook>>,
    /// Global loading state
    pub loading: RwSignal<bool>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
    /// Current login, restored from local storage on start
    pub session: RwSignal<Option<Session>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        search_results: create_rw_signal(Vec::new()),
        favorites: create_rw_signal(Vec::new()),
        loading: create_rw_signal(false),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
        session: create_rw_signal(SessionStore::load()),
    };

    provide_context(state);
}

/// Fetch the global state from context
pub fn use_global_state() -> GlobalState {
    expect_context::<GlobalState>()
}

impl GlobalState {
    pub fn is_logged_in(&self) -> bool {
        self.session.with(Option::is_some)
    }

    // ============ Auth ============

    pub async fn register(self, name: String, email: String, password: String) -> Result<(), String> {
        self.loading.set(true);
        self.error.set(None);

        let result = api::register(&name, &email, &password).await;
        self.loading.set(false);

        match result {
            Ok(auth) => {
                self.start_session(Session {
                    token: auth.token,
                    user: auth.user,
                });
                Ok(())
            }
            Err(failure) => {
                let message = server_message_or(&failure, "Register failed");
                self.error.set(Some(message.clone()));
                Err(message)
            }
        }
    }

    pub async fn login(self, email: String, password: String) -> Result<(), String> {
        self.loading.set(true);
        self.error.set(None);

        let result = api::login(&email, &password).await;
        self.loading.set(false);

        match result {
            Ok(auth) => {
                self.start_session(Session {
                    token: auth.token,
                    user: auth.user,
                });
                Ok(())
            }
            Err(failure) => {
                let message = server_message_or(&failure, "Login failed");
                self.error.set(Some(message.clone()));
                Err(message)
            }
        }
    }

    /// Forget the session and the favorites loaded for it
    pub fn logout(&self) {
        SessionStore::clear();
        self.session.set(None);
        self.favorites.set(Vec::new());
    }

    fn start_session(&self, session: Session) {
        SessionStore::save(&session);
        self.session.set(Some(session));
    }

    // ============ Search ============

    pub async fn search(self, query: SearchQuery) {
        self.loading.set(true);
        self.error.set(None);

        match api::search_books(&query).await {
            Ok(books) => self.search_results.set(books),
            Err(failure) => {
                web_sys::console::error_1(&format!("Search failed: {}", failure).into());
                self.error
                    .set(Some("Failed to fetch search results.".to_string()));
            }
        }

        self.loading.set(false);
    }

    // ============ Favorites ============

    pub async fn fetch_favorites(self) {
        let Some(session) = self.session.get_untracked() else {
            self.error
                .set(Some("Please log in to view favorites.".to_string()));
            return;
        };

        self.loading.set(true);
        self.error.set(None);

        match api::fetch_favorites(&session).await {
            Ok(favorites) => self.favorites.set(favorites),
            Err(failure) => {
                let message = if failure.status == 401 {
                    "Please log in to view favorites."
                } else {
                    "Failed to load favorites."
                };
                self.error.set(Some(message.to_string()));
            }
        }

        self.loading.set(false);
    }

    /// Add a favorite, then reload the list from the server
    pub async fn add_favorite(self, book_id: i64) -> Result<(), String> {
        let Some(session) = self.session.get_untracked() else {
            return Err(add_favorite_message(401).to_string());
        };

        match api::add_favorite(&session, book_id).await {
            Ok(()) => {
                self.fetch_favorites().await;
                Ok(())
            }
            Err(failure) => Err(add_favorite_message(failure.status).to_string()),
        }
    }

    /// Remove a favorite and drop it from the local list
    pub async fn remove_favorite(self, favorite_id: i64) -> Result<(), String> {
        let Some(session) = self.session.get_untracked() else {
            return Err(remove_favorite_message(401).to_string());
        };

        match api::remove_favorite(&session, favorite_id).await {
            Ok(()) => {
                self.favorites
                    .update(|favorites| favorites.retain(|f| f.favorite_id != favorite_id));
                Ok(())
            }
            Err(failure) => Err(remove_favorite_message(failure.status).to_string()),
        }
    }

    // ============ Reviews ============

    /// Summaries for the given books; failures yield an empty map
    pub async fn fetch_review_summary(self, book_ids: Vec<i64>) -> HashMap<i64, RatingSummary> {
        if book_ids.is_empty() {
            return HashMap::new();
        }

        api::fetch_review_summary(&book_ids)
            .await
            .unwrap_or_else(|failure| {
                web_sys::console::error_1(&format!("Summary failed: {}", failure).into());
                HashMap::new()
            })
    }

    /// Reviews for one book; failures yield an empty result
    pub async fn fetch_book_reviews(self, book_id: i64) -> BookReviews {
        api::fetch_book_reviews(book_id)
            .await
            .unwrap_or_default()
    }

    pub async fn save_review(self, book_id: i64, rating: u8, comment: String) -> Result<(), String> {
        let Some(session) = self.session.get_untracked() else {
            return Err(LOGIN_TO_REVIEW.to_string());
        };

        api::save_review(&session, book_id, rating, &comment)
            .await
            .map_err(|failure| review_error_message(&failure))
    }

    // ============ Notifications ============

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

pub const LOGIN_TO_REVIEW: &str = "Please log in to rate/review.";

/// The server's `{error}` text, or `fallback` when there was no response
fn server_message_or(failure: &ApiFailure, fallback: &str) -> String {
    if failure.status == 0 || failure.message.is_empty() {
        fallback.to_string()
    } else {
        failure.message.clone()
    }
}

fn add_favorite_message(status: u16) -> &'static str {
    match status {
        401 => "Please log in to add favorites.",
        409 => "This book is already in favorites.",
        _ => "Failed to add to favorites.",
    }
}

fn remove_favorite_message(status: u16) -> &'static str {
    match status {
        401 => "Please log in to remove favorites.",
        _ => "Failed to remove favorite.",
    }
}

fn review_error_message(failure: &ApiFailure) -> String {
    if failure.status == 401 {
        LOGIN_TO_REVIEW.to_string()
    } else {
        server_message_or(failure, "Failed to save review.")
    }
}
