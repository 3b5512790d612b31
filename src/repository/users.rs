//! Users repository for database operations

use sqlx::PgConnection;

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::user::{CreateUser, Permissions, UpdateUser, User, UserRow},
};

pub struct UsersRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> UsersRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user, returning the generated id.
    ///
    /// `password_hash` is the already-hashed credential; plaintext never
    /// reaches this layer.
    pub async fn add_one(&mut self, user: &CreateUser, password_hash: &str) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, username, password, permissions, excluded_categories)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(password_hash)
        .bind(sqlx::types::Json(&user.permissions))
        .bind(Vec::<String>::new())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate(
                    "There is already an account with the same username or email".to_string(),
                )
            } else {
                e.into()
            }
        })?;

        Ok(id)
    }

    /// Total number of user rows
    pub async fn count(&mut self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }

    /// Get user by id
    pub async fn get_by_id(&mut self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row.map(User::from))
    }

    /// Get user by username (authentication lookup)
    pub async fn get_by_username(&mut self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row.map(User::from))
    }

    /// Partial update. Fields absent from `patch` are left untouched;
    /// returns whether a row was updated.
    pub async fn edit_one(
        &mut self,
        id: i64,
        patch: &UpdateUser,
        password_hash: Option<&str>,
    ) -> AppResult<bool> {
        let mut sets = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(patch.name, "name");
        add_field!(patch.email, "email");
        add_field!(patch.username, "username");
        add_field!(password_hash, "password");
        add_field!(patch.excluded_categories, "excluded_categories");

        if sets.is_empty() {
            // Nothing to change; treat as a successful no-op on an existing row.
            return Ok(self.get_by_id(id).await?.is_some());
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ${}",
            sets.join(", "),
            param_idx
        );

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(patch.name);
        bind_field!(patch.email);
        bind_field!(patch.username);
        bind_field!(password_hash);
        bind_field!(patch.excluded_categories);

        let result = builder
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Duplicate(
                        "There is already an account with the same username or email".to_string(),
                    )
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace a user's permission record; returns whether a row was updated.
    pub async fn set_permissions(&mut self, id: i64, permissions: &Permissions) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET permissions = $1 WHERE id = $2")
            .bind(sqlx::types::Json(permissions))
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a user banned; returns whether a row was updated. There is no
    /// un-ban operation.
    pub async fn set_banned(&mut self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET banned = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
