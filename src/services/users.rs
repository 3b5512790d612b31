//! User management service: authorization-gated, transactional workflows

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Permissions, UpdateUser, User},
    policy::{may, Action},
    repository::UnitOfWork,
    services::password::PasswordService,
};

#[derive(Clone)]
pub struct UsersService {
    pool: Pool<Postgres>,
}

impl UsersService {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Seed the initial super-user account on an empty database. User
    /// creation is admin gated, so without this there would be no way to
    /// sign in at all.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        if uow.users().count().await? > 0 {
            return Ok(());
        }

        let admin = CreateUser {
            name: "Administrator".to_string(),
            email: "admin@localhost".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            permissions: Permissions {
                can_view_users: true,
                can_add_users: true,
                can_ban_users: true,
                can_delete_users: true,
                can_edit_user_profile: true,
                can_edit_user_permissions: true,
                super_user: true,
            },
        };
        let password_hash = PasswordService::hash(&admin.password)?;
        uow.users().add_one(&admin, &password_hash).await?;
        uow.commit().await?;

        tracing::warn!("Created bootstrap admin account 'admin' with the default password; change it");
        Ok(())
    }

    /// Create a user (admin gated; there is no self-registration).
    ///
    /// Granting `super_user` to the new account costs the actor its own
    /// flag, inside the same transaction.
    pub async fn create(&self, actor: &User, new_user: CreateUser) -> AppResult<i64> {
        if !may(actor, Action::AddUser { grants_super_user: new_user.permissions.super_user }) {
            return Err(AppError::forbidden());
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        if uow.users().get_by_username(&new_user.username).await?.is_some() {
            return Err(AppError::Duplicate(
                "There is already an account with the same username".to_string(),
            ));
        }

        let password_hash = PasswordService::hash(&new_user.password)?;
        let user_id = uow.users().add_one(&new_user, &password_hash).await?;

        if new_user.permissions.super_user {
            surrender_super_user(&mut uow, actor).await?;
        }

        uow.commit().await?;
        Ok(user_id)
    }

    /// Look up a user; the target defaults to the actor itself.
    pub async fn get(&self, actor: &User, user_id: Option<i64>) -> AppResult<User> {
        let target_id = user_id.unwrap_or(actor.id);
        if !may(actor, Action::ViewUser { target_id }) {
            return Err(AppError::forbidden());
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let user = uow.users().get_by_id(target_id).await?;
        uow.commit().await?;

        user.ok_or_else(|| AppError::NotFound("Object(s) not found".to_string()))
    }

    /// Partial profile update; the target defaults to the actor itself.
    pub async fn edit(
        &self,
        actor: &User,
        user_id: Option<i64>,
        patch: UpdateUser,
    ) -> AppResult<()> {
        let target_id = user_id.unwrap_or(actor.id);
        if !may(actor, Action::EditUser { target_id }) {
            return Err(AppError::forbidden());
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let target = uow
            .users()
            .get_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Object(s) not found".to_string()))?;

        let password_hash = match patch.password.as_deref() {
            Some(plain) => Some(PasswordService::hash(plain)?),
            None => None,
        };
        uow.users()
            .edit_one(target.id, &patch, password_hash.as_deref())
            .await?;

        uow.commit().await?;
        Ok(())
    }

    /// Replace a target's permission record, under the escalation guards in
    /// [`crate::policy`]. Granting `super_user` surrenders the actor's flag
    /// in the same transaction.
    pub async fn change_permissions(
        &self,
        actor: &User,
        user_id: i64,
        permissions: Permissions,
    ) -> AppResult<()> {
        // Actor-side rules first, so a caller without the capability learns
        // nothing about the target's existence.
        if !may(actor, Action::ChangePermissions { target: None, new: &permissions }) {
            return Err(AppError::forbidden());
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let target = uow
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Object(s) not found".to_string()))?;
        if !may(actor, Action::ChangePermissions { target: Some(&target), new: &permissions }) {
            return Err(AppError::forbidden());
        }

        uow.users().set_permissions(target.id, &permissions).await?;

        if permissions.super_user {
            surrender_super_user(&mut uow, actor).await?;
        }

        uow.commit().await?;
        Ok(())
    }

    /// Ban a user. There is no un-ban operation.
    pub async fn ban(&self, actor: &User, user_id: i64) -> AppResult<()> {
        if !may(actor, Action::BanUser) {
            return Err(AppError::forbidden());
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let updated = uow.users().set_banned(user_id).await?;
        if !updated {
            return Err(AppError::NotFound("Object(s) not found".to_string()));
        }
        uow.commit().await?;
        Ok(())
    }
}

/// Single-holder rule for `super_user`: both paths that can grant the flag
/// to another account (creation and permission change) route through here to
/// drop the actor's own flag. Runs inside the caller's transaction, so a
/// failed revoke rolls the grant back with it.
async fn surrender_super_user(uow: &mut UnitOfWork, actor: &User) -> AppResult<()> {
    let mut downgraded = actor.permissions;
    downgraded.super_user = false;
    uow.users().set_permissions(actor.id, &downgraded).await?;
    Ok(())
}
