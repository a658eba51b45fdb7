//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::PublicUser;

// ============================================
// AUTH DTOs
// ============================================

/// Registration request. Fields are optional so a missing field is a
/// validation error rather than a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Token plus the authenticated user
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Decoded token payload for `/api/auth/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

// ============================================
// BOOK DTOs
// ============================================

/// Search query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

// ============================================
// FAVORITE DTOs
// ============================================

/// Add-favorite request; `book_id` may be a number or a numeric string
#[derive(Debug, Default, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub book_id: Option<Value>,
}

// ============================================
// REVIEW DTOs
// ============================================

/// Review upsert request; `rating` may be a number or a numeric string
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Bulk summary query: `ids=1,2,3`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    #[serde(default)]
    pub ids: Option<String>,
}

impl SummaryParams {
    /// Parse the comma-separated id list, dropping entries that are not integers
    pub fn book_ids(&self) -> Vec<i64> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    }
}

// ============================================
// SHARED DTOs
// ============================================

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Database status
    pub database: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// Interpret a JSON value as an integer id or rating.
///
/// Accepts integral numbers and strings holding an integer; anything else
/// (fractions, booleans, text) is `None`.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
