//! Login Session
//!
//! The session is an explicit value (token plus user). [`SessionStore`] is
//! the only code that reads or writes it in browser local storage.

use serde::{Deserialize, Serialize};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// The logged-in user as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A bearer token and the user it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    /// Rebuild a session from stored values; both must be present and valid
    pub fn from_stored(token: Option<String>, user_json: Option<String>) -> Option<Self> {
        let token = token.filter(|t| !t.is_empty())?;
        let user = serde_json::from_str(&user_json?).ok()?;
        Some(Self { token, user })
    }
}

/// Persists the session in local storage
pub struct SessionStore;

impl SessionStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    /// Restore a previously saved session
    pub fn load() -> Option<Session> {
        let storage = Self::storage()?;
        Session::from_stored(
            storage.get_item(TOKEN_KEY).ok().flatten(),
            storage.get_item(USER_KEY).ok().flatten(),
        )
    }

    pub fn save(session: &Session) {
        let Some(storage) = Self::storage() else {
            return;
        };

        let _ = storage.set_item(TOKEN_KEY, &session.token);
        if let Ok(user) = serde_json::to_string(&session.user) {
            let _ = storage.set_item(USER_KEY, &user);
        }
    }

    pub fn clear() {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }
}
