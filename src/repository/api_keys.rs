//! API keys repository for database operations

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::api_key::{ApiKey, ApiKeyInfo},
};

pub struct ApiKeysRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ApiKeysRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a key bound to a user, returning the generated id
    pub async fn add_one(
        &mut self,
        user_id: i64,
        key: &str,
        expire_date: NaiveDate,
    ) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO api_keys (user_id, key, expire_date) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(key)
        .bind(expire_date)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    /// Get key record by id
    pub async fn get_by_id(&mut self, id: i64) -> AppResult<Option<ApiKey>> {
        let key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(key)
    }

    /// Look up a key record by its token value
    pub async fn get_by_key(&mut self, key: &str) -> AppResult<Option<ApiKey>> {
        let record = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key = $1")
            .bind(key)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(record)
    }

    /// All of a user's key records, plaintext omitted
    pub async fn get_all_for_user(&mut self, user_id: i64) -> AppResult<Vec<ApiKeyInfo>> {
        let keys = sqlx::query_as::<_, ApiKeyInfo>(
            "SELECT id, user_id, expire_date, created_at FROM api_keys WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(keys)
    }

    /// Delete by id; returns whether a row was removed
    pub async fn delete_by_id(&mut self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
