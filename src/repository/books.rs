//! Books repository for database operations

use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, RemoteBook},
};

pub struct BooksRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> BooksRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get book by local id
    pub async fn get_by_id(&mut self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(book)
    }

    /// Get book by provider volume id
    pub async fn get_by_gb_id(&mut self, gb_id: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE gb_id = $1")
            .bind(gb_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(book)
    }

    /// Get book by ISBN. Unlike `gb_id`, ISBN carries no unique index; more
    /// than one match is a contract violation, not a silent first-pick.
    pub async fn get_by_isbn(&mut self, isbn: &str) -> AppResult<Option<Book>> {
        let mut books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_all(&mut *self.conn)
            .await?;

        match books.len() {
            0 => Ok(None),
            1 => Ok(books.pop()),
            n => Err(AppError::Internal(format!(
                "Expected at most one book with ISBN {}, found {}",
                isbn, n
            ))),
        }
    }

    /// Insert a provider record, returning the local id. Concurrent imports
    /// of the same `gb_id` race on the unique index; the no-op conflict
    /// update makes both callers land on the one surviving row.
    pub async fn upsert_remote(&mut self, book: &RemoteBook) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (gb_id, isbn, title, subtitle, description, language, pub_date, categories, authors)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (gb_id) DO UPDATE SET gb_id = EXCLUDED.gb_id
            RETURNING id
            "#,
        )
        .bind(&book.gb_id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.description)
        .bind(&book.language)
        .bind(&book.pub_date)
        .bind(&book.categories)
        .bind(&book.authors)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    /// All books associated with a user via the library join
    pub async fn get_user_library(&mut self, user_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            JOIN library l ON l.book_id = b.id
            WHERE l.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(books)
    }
}
