//! Favorite queries
//!
//! Mutations are always filtered on the owning user id.

use rusqlite::params;

use super::books::book_from_row;
use super::{now_timestamp, Database, DbResult, FavoriteBook};

impl Database {
    /// Bookmark a book for a user, returning the new favorite id.
    ///
    /// Fails with `Conflict` if already favorited and `MissingReference`
    /// if the book does not exist.
    pub async fn add_favorite(&self, user_id: i64, book_id: i64) -> DbResult<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO favorites (user_id, book_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, book_id, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// A user's favorites joined with book data, most recent first
    pub async fn list_favorites(&self, user_id: i64) -> DbResult<Vec<FavoriteBook>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT f.id AS favorite_id,
                    b.id, b.title, b.description, b.author, b.genre,
                    b.publication_year, b.price, b.cover
             FROM favorites f
             JOIN books b ON b.id = f.book_id
             WHERE f.user_id = ?1
             ORDER BY f.created_at DESC, f.id DESC",
        )?;

        let favorites = stmt
            .query_map(params![user_id], |row| {
                Ok(FavoriteBook {
                    favorite_id: row.get("favorite_id")?,
                    book: book_from_row(row)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favorites)
    }

    /// Delete a favorite owned by `user_id`.
    ///
    /// Returns `false` when no such favorite exists for this user, including
    /// when it belongs to someone else.
    pub async fn remove_favorite(&self, user_id: i64, favorite_id: i64) -> DbResult<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "DELETE FROM favorites WHERE id = ?1 AND user_id = ?2",
            params![favorite_id, user_id],
        )?;
        Ok(affected > 0)
    }
}
