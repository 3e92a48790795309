//! Books repository
//!
//! Each book belongs to a single author and carries a denormalized favorite
//! count alongside the set of users who favorited it. SQLite has no array
//! type, so `favorited_by` is a JSON array column; every write that touches
//! the set adjusts `favorite_count` in the same UPDATE statement so the two
//! stay consistent under concurrent toggles.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::{json_to_vec, now_iso8601, vec_to_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub favorite_count: i64,
    pub favorited_by: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub author_id: String,
}

type BookRow = (String, String, String, i64, String, String, String);

const BOOK_COLUMNS: &str =
    "id, title, author_id, favorite_count, favorited_by, created_at, updated_at";

fn row_to_record(r: BookRow) -> BookRecord {
    BookRecord {
        id: r.0,
        title: r.1,
        author_id: r.2,
        favorite_count: r.3,
        favorited_by: json_to_vec(&r.4),
        created_at: r.5,
        updated_at: r.6,
    }
}

pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new book with an empty favorite set
    pub async fn create(&self, book: CreateBook) -> Result<BookRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_id, favorite_count, favorited_by, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(&book.author_id)
        .bind(vec_to_json::<String>(&[]))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create book"))
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<BookRecord>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    /// List all books, newest first
    pub async fn list_all(&self) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// List books authored by a user, newest first
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE author_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// List books a user has favorited, newest first
    pub async fn list_favorited_by(&self, user_id: &str) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books
            WHERE EXISTS (SELECT 1 FROM json_each(books.favorited_by) WHERE value = ?)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Fetch a page of books newest-first, starting strictly after the given
    /// (created_at, id) boundary. `limit + 1` rows lets the caller detect
    /// whether another page exists.
    pub async fn list_page(
        &self,
        before: Option<(&str, &str)>,
        limit: i64,
    ) -> Result<Vec<BookRecord>> {
        let rows = match before {
            Some((created_at, id)) => {
                sqlx::query_as::<_, BookRow>(&format!(
                    r#"
                    SELECT {BOOK_COLUMNS} FROM books
                    WHERE (created_at, id) < (?, ?)
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                    "#
                ))
                .bind(created_at)
                .bind(id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, id DESC LIMIT ?"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Update a book's title, returning the updated record. Returns None if
    /// the book does not exist.
    pub async fn update_title(&self, id: &str, title: &str) -> Result<Option<BookRecord>> {
        let now = now_iso8601();

        let result = sqlx::query("UPDATE books SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Delete a book. Returns true if a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a user to a book's favorite set and bump the count, in a single
    /// statement. The membership guard keeps the operation idempotent under
    /// concurrent toggles: a user already in the set is never added twice.
    pub async fn add_favorite(&self, id: &str, user_id: &str) -> Result<Option<BookRecord>> {
        let now = now_iso8601();

        sqlx::query(
            r#"
            UPDATE books
            SET favorited_by = json_insert(favorited_by, '$[#]', ?),
                favorite_count = favorite_count + 1,
                updated_at = ?
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM json_each(books.favorited_by) WHERE value = ?)
            "#,
        )
        .bind(user_id)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Remove a user from a book's favorite set and drop the count, in a
    /// single statement. A no-op when the user is not in the set.
    pub async fn remove_favorite(&self, id: &str, user_id: &str) -> Result<Option<BookRecord>> {
        let now = now_iso8601();

        sqlx::query(
            r#"
            UPDATE books
            SET favorited_by = (
                    SELECT COALESCE(json_group_array(value), '[]')
                    FROM json_each(books.favorited_by)
                    WHERE value <> ?
                ),
                favorite_count = favorite_count - 1,
                updated_at = ?
            WHERE id = ?
              AND EXISTS (SELECT 1 FROM json_each(books.favorited_by) WHERE value = ?)
            "#,
        )
        .bind(user_id)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }
}
