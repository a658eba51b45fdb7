//! User queries

use rusqlite::{params, OptionalExtension, Row};

use super::{now_timestamp, Database, DbResult, UserRecord};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    /// Insert a user.
    ///
    /// Callers pass an already-normalized email and an already-computed hash.
    /// Returns [`DbError::Conflict`](super::DbError::Conflict) when the email is taken.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> DbResult<UserRecord> {
        let conn = self.conn.lock().await;
        let created_at = now_timestamp();

        conn.execute(
            "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, password_hash, created_at],
        )?;

        Ok(UserRecord {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let conn = self.conn.lock().await;
        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at
                 FROM users WHERE email = ?1 LIMIT 1",
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}
