//! Book catalog queries
//!
//! Listing, filtered search, and catalog seeding. There is no create,
//! update, or delete over HTTP; [`Database::insert_books`] exists only for
//! seeding an empty catalog.

use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::path::Path;

use super::{Book, Database, DbResult, NewBook};

const BOOK_COLUMNS: &str =
    "id, title, description, author, genre, publication_year, price, cover";

pub(super) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        author: row.get("author")?,
        genre: row.get("genre")?,
        publication_year: row.get("publication_year")?,
        price: row.get("price")?,
        cover: row.get("cover")?,
    })
}

/// Conjunctive search filter. Each present field is a case-insensitive
/// substring match; `q` matches title or description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub q: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl SearchFilter {
    /// Build a filter, treating blank strings as absent
    pub fn new(q: Option<String>, author: Option<String>, genre: Option<String>) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            q: clean(q),
            author: clean(author),
            genre: clean(genre),
        }
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.author.is_none() && self.genre.is_none()
    }

    fn to_sql(&self) -> (String, Vec<String>) {
        let mut sql = format!("SELECT {} FROM books WHERE 1=1", BOOK_COLUMNS);
        let mut values = Vec::new();

        if let Some(q) = &self.q {
            let pattern = like_pattern(q);
            sql.push_str(" AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            values.push(pattern.clone());
            values.push(pattern);
        }
        if let Some(author) = &self.author {
            sql.push_str(" AND author LIKE ? ESCAPE '\\'");
            values.push(like_pattern(author));
        }
        if let Some(genre) = &self.genre {
            sql.push_str(" AND genre LIKE ? ESCAPE '\\'");
            values.push(like_pattern(genre));
        }

        sql.push_str(" ORDER BY id");
        (sql, values)
    }
}

/// Wrap a term as `%term%`, escaping LIKE wildcards so they match literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Database {
    /// All books, unpaginated
    pub async fn list_books(&self) -> DbResult<Vec<Book>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM books ORDER BY id",
            BOOK_COLUMNS
        ))?;
        let books = stmt
            .query_map([], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    /// Books matching every criterion in `filter`.
    ///
    /// An empty filter matches everything; the HTTP layer rejects it first.
    pub async fn search_books(&self, filter: &SearchFilter) -> DbResult<Vec<Book>> {
        let (sql, values) = filter.to_sql();

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let books = stmt
            .query_map(params_from_iter(values.iter()), book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> DbResult<Option<Book>> {
        let conn = self.conn.lock().await;
        let book = conn
            .query_row(
                &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
                params![id],
                book_from_row,
            )
            .optional()?;
        Ok(book)
    }

    pub async fn book_count(&self) -> DbResult<i64> {
        let conn = self.conn.lock().await;
        let count = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert books in a single transaction, returning how many were written
    pub async fn insert_books(&self, books: &[NewBook]) -> DbResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO books (title, description, author, genre, publication_year, price, cover)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for book in books {
                stmt.execute(params![
                    book.title,
                    book.description,
                    book.author,
                    book.genre,
                    book.publication_year,
                    book.price,
                    book.cover,
                ])?;
            }
        }

        tx.commit()?;
        Ok(books.len())
    }

    /// Seed the catalog from a JSON array of books if the table is empty.
    ///
    /// Returns the number of books inserted (0 when the catalog already had rows).
    pub async fn seed_catalog(&self, path: &Path) -> DbResult<usize> {
        if self.book_count().await? > 0 {
            tracing::debug!(path = ?path, "Catalog already populated, skipping seed");
            return Ok(0);
        }

        let content = std::fs::read_to_string(path)?;
        let books: Vec<NewBook> = serde_json::from_str(&content)?;

        let inserted = self.insert_books(&books).await?;
        tracing::info!(path = ?path, inserted, "Seeded book catalog");
        Ok(inserted)
    }
}

#[cfg(test)]
pub(crate) fn sample_books() -> Vec<NewBook> {
    fn book(title: &str, desc: &str, author: &str, genre: &str, year: i32) -> NewBook {
        NewBook {
            title: title.to_string(),
            description: desc.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            publication_year: Some(year),
            price: Some(12.5),
            cover: None,
        }
    }

    vec![
        book("The Hobbit", "A hobbit goes on an adventure", "J.R.R. Tolkien", "Fantasy", 1937),
        book("Dune", "Politics and sandworms on Arrakis", "Frank Herbert", "Science Fiction", 1965),
        book("A Wizard of Earthsea", "A young mage learns the cost of power", "Ursula K. Le Guin", "Fantasy", 1968),
        book("The Left Hand of Darkness", "An envoy on a winter planet", "Ursula K. Le Guin", "Science Fiction", 1969),
        book("Gone Girl", "A marriage goes wrong", "Gillian Flynn", "Thriller", 2012),
        book("100% Wolf", "A werewolf puppy story", "Jayne Lyons", "Children's Fantasy", 2009),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_books(&sample_books()).await.unwrap();
        db
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_filter_blank_fields_are_absent() {
        let filter = SearchFilter::new(Some("  ".into()), None, Some(String::new()));
        assert!(filter.is_empty());

        let filter = SearchFilter::new(None, Some(" Herbert ".into()), None);
        assert!(!filter.is_empty());
        assert_eq!(filter.author.as_deref(), Some("Herbert"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_list_books() {
        let db = seeded().await;
        let books = db.list_books().await.unwrap();
        assert_eq!(books.len(), sample_books().len());
        assert_eq!(books[0].title, "The Hobbit");
        assert_eq!(books[0].publication_year, Some(1937));
    }

    #[tokio::test]
    async fn test_search_by_genre_is_case_insensitive_substring() {
        let db = seeded().await;
        let filter = SearchFilter::new(None, None, Some("fantasy".into()));

        let books = db.search_books(&filter).await.unwrap();
        assert_eq!(
            titles(&books),
            vec!["The Hobbit", "A Wizard of Earthsea", "100% Wolf"]
        );
        assert!(books
            .iter()
            .all(|b| b.genre.to_lowercase().contains("fantasy")));
    }

    #[tokio::test]
    async fn test_search_keyword_matches_title_or_description() {
        let db = seeded().await;

        let by_title = db
            .search_books(&SearchFilter::new(Some("dune".into()), None, None))
            .await
            .unwrap();
        assert_eq!(titles(&by_title), vec!["Dune"]);

        let by_desc = db
            .search_books(&SearchFilter::new(Some("winter".into()), None, None))
            .await
            .unwrap();
        assert_eq!(titles(&by_desc), vec!["The Left Hand of Darkness"]);
    }

    #[tokio::test]
    async fn test_search_criteria_are_conjunctive() {
        let db = seeded().await;
        let filter = SearchFilter::new(None, Some("le guin".into()), Some("science".into()));

        let books = db.search_books(&filter).await.unwrap();
        assert_eq!(titles(&books), vec!["The Left Hand of Darkness"]);
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let db = seeded().await;

        let books = db
            .search_books(&SearchFilter::new(Some("100%".into()), None, None))
            .await
            .unwrap();
        assert_eq!(titles(&books), vec!["100% Wolf"]);

        let none = db
            .search_books(&SearchFilter::new(Some("%".into()), Some("_".into()), None))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_book() {
        let db = seeded().await;
        let book = db.get_book(2).await.unwrap().unwrap();
        assert_eq!(book.title, "Dune");
        assert!(db.get_book(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_catalog_only_when_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"title": "Emma", "desc": "Matchmaking", "author": "Jane Austen", "genre": "Romance"},
                {"title": "Beloved", "description": "Haunting", "author": "Toni Morrison", "genre": "Literary", "publication_year": 1987}
            ]"#,
        )
        .unwrap();

        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_catalog(&path).await.unwrap(), 2);
        assert_eq!(db.seed_catalog(&path).await.unwrap(), 0);
        assert_eq!(db.book_count().await.unwrap(), 2);

        let beloved = db.get_book(2).await.unwrap().unwrap();
        assert_eq!(beloved.description, "Haunting");
        assert_eq!(beloved.publication_year, Some(1987));
    }
}
