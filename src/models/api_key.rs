//! API key model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Stored API key. The token is kept as the lookup key itself (not hashed),
/// so this struct never leaves the service layer; listings use
/// [`ApiKeyInfo`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKey {
    pub id: i64,
    pub key: String,
    pub user_id: i64,
    pub expire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Key record as returned by the listing endpoint — no plaintext token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ApiKeyInfo {
    pub id: i64,
    pub user_id: i64,
    pub expire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyInfo {
    fn from(key: ApiKey) -> Self {
        ApiKeyInfo {
            id: key.id,
            user_id: key.user_id,
            expire_date: key.expire_date,
            created_at: key.created_at,
        }
    }
}
