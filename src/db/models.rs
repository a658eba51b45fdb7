//! Database row types
//!
//! Rows returned by the query methods on [`Database`](super::Database).
//! The serialized field names are the JSON shapes the API returns.

use serde::{Deserialize, Serialize};

/// A stored user row, including the password hash.
///
/// Never serialized; handlers convert to [`PublicUser`] before responding.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRecord {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The user fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A book in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub author: String,
    pub genre: String,
    pub publication_year: Option<i32>,
    pub price: Option<f64>,
    pub cover: Option<String>,
}

/// A book to insert when seeding the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(rename = "desc", alias = "description", default)]
    pub description: String,
    pub author: String,
    pub genre: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// A favorite joined with its book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteBook {
    pub favorite_id: i64,
    #[serde(flatten)]
    pub book: Book,
}

/// A review joined with its author's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: i64,
    pub user_name: String,
}

/// Aggregate rating for one book.
///
/// `avg_rating` is rounded to two decimals and `None` when there are no reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub avg_rating: Option<f64>,
    pub review_count: i64,
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self {
            avg_rating: None,
            review_count: 0,
        }
    }
}

/// Reviews for a book together with its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookReviews {
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}
