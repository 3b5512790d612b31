//! API key issuance, listing, deletion and resolution

use chrono::{NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::{Pool, Postgres};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{api_key::ApiKeyInfo, user::User},
    repository::UnitOfWork,
};

#[derive(Clone)]
pub struct ApiKeyService {
    pool: Pool<Postgres>,
    config: AuthConfig,
}

impl ApiKeyService {
    pub fn new(pool: Pool<Postgres>, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Issue a new key for the actor. The plaintext is returned exactly
    /// once; listings only ever expose [`ApiKeyInfo`].
    pub async fn create(&self, actor: &User, expire_date: NaiveDate) -> AppResult<String> {
        if expire_date < Utc::now().date_naive() {
            return Err(AppError::Validation(
                "Expire date must be in the future".to_string(),
            ));
        }

        let key = generate_key(self.config.api_key_length);

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        uow.api_keys().add_one(actor.id, &key, expire_date).await?;
        uow.commit().await?;

        Ok(key)
    }

    /// List the actor's key records (plaintext omitted)
    pub async fn list(&self, actor: &User) -> AppResult<Vec<ApiKeyInfo>> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let keys = uow.api_keys().get_all_for_user(actor.id).await?;
        uow.commit().await?;

        Ok(keys)
    }

    /// Delete one of the actor's keys. Deleting someone else's key is
    /// Forbidden; the ownership check always precedes the delete.
    pub async fn delete(&self, actor: &User, key_id: i64) -> AppResult<()> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let key = uow
            .api_keys()
            .get_by_id(key_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Object(s) not found".to_string()))?;
        if key.user_id != actor.id {
            return Err(AppError::forbidden());
        }
        uow.api_keys().delete_by_id(key_id).await?;

        uow.commit().await?;
        Ok(())
    }

    /// Resolve a presented key to its owner. Unknown keys, expired keys and
    /// banned owners all collapse to the same Unauthorized.
    pub async fn resolve(&self, key: &str) -> AppResult<User> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let record = uow
            .api_keys()
            .get_by_key(key)
            .await?
            .ok_or_else(AppError::invalid_token)?;
        if record.expire_date < Utc::now().date_naive() {
            return Err(AppError::invalid_token());
        }
        let user = uow
            .users()
            .get_by_id(record.user_id)
            .await?
            .ok_or_else(AppError::invalid_token)?;

        uow.commit().await?;

        if user.banned {
            return Err(AppError::invalid_token());
        }
        Ok(user)
    }
}

/// High-entropy alphanumeric token
fn generate_key(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Permissions;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn generated_keys_are_alphanumeric_and_sized() {
        let key = generate_key(32);
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(32), generate_key(32));
    }

    #[tokio::test]
    async fn past_expiration_is_rejected_before_any_storage_work() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let svc = ApiKeyService::new(pool, AuthConfig::default());

        let actor = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: String::new(),
            banned: false,
            permissions: Permissions::default(),
            excluded_categories: vec![],
            created_at: Utc::now(),
        };

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let err = svc.create(&actor, yesterday).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
