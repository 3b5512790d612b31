//! Library association repository (books <-> users many-to-many)

use sqlx::PgConnection;

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::book::LibraryEntry,
};

pub struct LibraryRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> LibraryRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get the association for a (book, user) pair, if present
    pub async fn get_association(
        &mut self,
        book_id: i64,
        user_id: i64,
    ) -> AppResult<Option<LibraryEntry>> {
        let entry = sqlx::query_as::<_, LibraryEntry>(
            "SELECT book_id, user_id FROM library WHERE book_id = $1 AND user_id = $2",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(entry)
    }

    /// Create the association. The composite primary key rejects a second
    /// row for the same pair.
    pub async fn add_association(&mut self, book_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query("INSERT INTO library (book_id, user_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Duplicate("This book is already in the user's library".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(())
    }

    /// Remove the association; absent rows are not an error at this layer.
    pub async fn del_association(&mut self, book_id: i64, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM library WHERE book_id = $1 AND user_id = $2")
            .bind(book_id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
