//! Review queries
//!
//! One review per (user, book); resubmission overwrites rating and comment
//! and refreshes `updated_at`.

use rusqlite::{params, params_from_iter};
use std::collections::{BTreeMap, BTreeSet};

use super::{now_timestamp, BookReviews, Database, DbResult, RatingSummary, Review};

/// Ids bound per `IN (...)` query, below SQLite's 999-parameter floor
const SUMMARY_CHUNK: usize = 500;

impl Database {
    /// Insert or overwrite the user's review for a book.
    ///
    /// Fails with `MissingReference` if the book does not exist. Rating bounds
    /// are validated by the caller; the schema CHECK is a backstop.
    pub async fn upsert_review(
        &self,
        user_id: i64,
        book_id: i64,
        rating: i64,
        comment: Option<&str>,
    ) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO reviews (user_id, book_id, rating, comment, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (user_id, book_id) DO UPDATE SET
                 rating = excluded.rating,
                 comment = excluded.comment,
                 updated_at = excluded.updated_at",
            params![user_id, book_id, rating, comment, now_timestamp()],
        )?;
        Ok(())
    }

    /// Delete a review owned by `user_id`; `false` if none matched
    pub async fn delete_review(&self, user_id: i64, review_id: i64) -> DbResult<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "DELETE FROM reviews WHERE id = ?1 AND user_id = ?2",
            params![review_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Average (2 decimals) and count for one book
    pub async fn rating_summary(&self, book_id: i64) -> DbResult<RatingSummary> {
        let conn = self.conn.lock().await;
        let summary = conn.query_row(
            "SELECT ROUND(AVG(rating), 2), COUNT(*) FROM reviews WHERE book_id = ?1",
            params![book_id],
            |row| {
                Ok(RatingSummary {
                    avg_rating: row.get(0)?,
                    review_count: row.get(1)?,
                })
            },
        )?;
        Ok(summary)
    }

    /// Reviews for a book with author names, most recently updated first
    pub async fn list_reviews(&self, book_id: i64) -> DbResult<Vec<Review>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.rating, r.comment, r.created_at, r.updated_at,
                    u.id AS user_id, u.name AS user_name
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.book_id = ?1
             ORDER BY r.updated_at DESC, r.id DESC",
        )?;

        let reviews = stmt
            .query_map(params![book_id], |row| {
                Ok(Review {
                    id: row.get("id")?,
                    rating: row.get("rating")?,
                    comment: row.get("comment")?,
                    created_at: row.get("created_at")?,
                    updated_at: row.get("updated_at")?,
                    user_id: row.get("user_id")?,
                    user_name: row.get("user_name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    /// Summary plus review list for one book.
    ///
    /// The two reads run as separate statements and are not atomic with
    /// respect to concurrent writes.
    pub async fn book_reviews(&self, book_id: i64) -> DbResult<BookReviews> {
        let summary = self.rating_summary(book_id).await?;
        let reviews = self.list_reviews(book_id).await?;
        Ok(BookReviews { summary, reviews })
    }

    /// Grouped summaries for a set of books.
    ///
    /// Every requested id is present in the map; books without reviews get
    /// `{avg_rating: null, review_count: 0}`. Duplicate ids are collapsed and
    /// the lookup runs in chunks of `SUMMARY_CHUNK` to stay under SQLite's
    /// bound-parameter limit. An empty id set returns an empty map without
    /// touching the database.
    pub async fn rating_summaries(&self, book_ids: &[i64]) -> DbResult<BTreeMap<i64, RatingSummary>> {
        let wanted: BTreeSet<i64> = book_ids.iter().copied().collect();
        let mut out: BTreeMap<i64, RatingSummary> = wanted
            .iter()
            .map(|&id| (id, RatingSummary::default()))
            .collect();

        if wanted.is_empty() {
            return Ok(out);
        }

        let ids: Vec<i64> = wanted.into_iter().collect();
        let conn = self.conn.lock().await;

        for chunk in ids.chunks(SUMMARY_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT book_id, ROUND(AVG(rating), 2), COUNT(*)
                 FROM reviews
                 WHERE book_id IN ({})
                 GROUP BY book_id",
                placeholders
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    RatingSummary {
                        avg_rating: row.get(1)?,
                        review_count: row.get(2)?,
                    },
                ))
            })?;

            for row in rows {
                let (book_id, summary) = row?;
                out.insert(book_id, summary);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::books::sample_books;
    use crate::db::{Database, DbError, RatingSummary};
    use std::time::Duration;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        db.insert_books(&sample_books()).await.unwrap();
        let ann = db.create_user("Ann", "ann@example.com", "h").await.unwrap();
        let bob = db.create_user("Bob", "bob@example.com", "h").await.unwrap();
        (db, ann.id, bob.id)
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_review_and_bumps_updated_at() {
        let (db, ann, _) = setup().await;

        db.upsert_review(ann, 1, 4, Some("Lovely")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        db.upsert_review(ann, 1, 4, None).await.unwrap();

        let reviews = db.list_reviews(1).await.unwrap();
        assert_eq!(reviews.len(), 1);

        let review = &reviews[0];
        assert_eq!(review.rating, 4);
        assert_eq!(review.comment, None);
        assert_eq!(review.user_name, "Ann");
        assert!(review.updated_at > review.created_at);
    }

    #[tokio::test]
    async fn test_upsert_missing_book_is_missing_reference() {
        let (db, ann, _) = setup().await;
        let err = db.upsert_review(ann, 404, 3, None).await.unwrap_err();
        assert!(matches!(err, DbError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_summary_rounds_average() {
        let (db, ann, bob) = setup().await;
        let cat = db.create_user("Cat", "cat@example.com", "h").await.unwrap();

        db.upsert_review(ann, 2, 5, None).await.unwrap();
        db.upsert_review(bob, 2, 4, None).await.unwrap();
        db.upsert_review(cat.id, 2, 4, None).await.unwrap();

        let summary = db.rating_summary(2).await.unwrap();
        assert_eq!(summary.review_count, 3);
        assert_eq!(summary.avg_rating, Some(4.33));
    }

    #[tokio::test]
    async fn test_summary_without_reviews() {
        let (db, _, _) = setup().await;
        assert_eq!(db.rating_summary(1).await.unwrap(), RatingSummary::default());

        let all = db.book_reviews(1).await.unwrap();
        assert!(all.reviews.is_empty());
        assert_eq!(all.summary.avg_rating, None);
    }

    #[tokio::test]
    async fn test_bulk_summaries() {
        let (db, ann, bob) = setup().await;
        db.upsert_review(ann, 1, 5, None).await.unwrap();
        db.upsert_review(bob, 1, 2, None).await.unwrap();
        db.upsert_review(ann, 3, 3, None).await.unwrap();

        assert!(db.rating_summaries(&[]).await.unwrap().is_empty());

        let map = db.rating_summaries(&[1, 2, 3]).await.unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&1].avg_rating, Some(3.5));
        assert_eq!(map[&1].review_count, 2);
        assert_eq!(map[&3].review_count, 1);
        assert_eq!(map[&2], RatingSummary::default());
    }

    #[tokio::test]
    async fn test_bulk_summaries_many_ids() {
        let (db, ann, _) = setup().await;
        db.upsert_review(ann, 1, 4, None).await.unwrap();

        let mut ids: Vec<i64> = (1..=2500).collect();
        ids.extend([1, 1, 2]);

        let map = db.rating_summaries(&ids).await.unwrap();
        assert_eq!(map.len(), 2500);
        assert_eq!(map[&1].avg_rating, Some(4.0));
        assert_eq!(map[&1].review_count, 1);
        assert_eq!(map[&2400], RatingSummary::default());
    }

    #[tokio::test]
    async fn test_delete_only_own_review() {
        let (db, ann, bob) = setup().await;
        db.upsert_review(ann, 1, 5, None).await.unwrap();
        let review_id = db.list_reviews(1).await.unwrap()[0].id;

        assert!(!db.delete_review(bob, review_id).await.unwrap());
        assert!(db.delete_review(ann, review_id).await.unwrap());
        assert!(db.list_reviews(1).await.unwrap().is_empty());
    }
}
