//! User management endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Permissions, UpdateUser, User},
};

use super::{AuthenticatedUser, ObjectCreated, ObjectUpdated};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserIdParam {
    /// Target user; defaults to the caller
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequiredUserIdParam {
    pub user_id: i64,
}

/// Create a new user (requires the add-users capability)
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = ObjectCreated),
        (status = 403, description = "Missing capability", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(new_user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<ObjectCreated>)> {
    new_user
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.services.users.create(&actor, new_user).await?;
    Ok((StatusCode::CREATED, Json(ObjectCreated::new(id))))
}

/// Get a user; without `user_id` returns the caller
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserIdParam),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Missing capability", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<UserIdParam>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get(&actor, params.user_id).await?;
    Ok(Json(user))
}

/// Partially update a user; without `user_id` updates the caller
#[utoipa::path(
    patch,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserIdParam),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = ObjectUpdated),
        (status = 403, description = "Missing capability", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<UserIdParam>,
    Json(patch): Json<UpdateUser>,
) -> AppResult<Json<ObjectUpdated>> {
    patch
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .users
        .edit(&actor, params.user_id, patch)
        .await?;
    Ok(Json(ObjectUpdated::new()))
}

/// Replace a user's permission record
#[utoipa::path(
    put,
    path = "/users/permissions",
    tag = "users",
    security(("bearer_auth" = [])),
    params(RequiredUserIdParam),
    request_body = Permissions,
    responses(
        (status = 200, description = "Permissions updated", body = ObjectUpdated),
        (status = 403, description = "Missing capability or escalation attempt", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user_permissions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<RequiredUserIdParam>,
    Json(permissions): Json<Permissions>,
) -> AppResult<Json<ObjectUpdated>> {
    state
        .services
        .users
        .change_permissions(&actor, params.user_id, permissions)
        .await?;
    Ok(Json(ObjectUpdated::new()))
}

/// Ban a user
#[utoipa::path(
    post,
    path = "/users/ban",
    tag = "users",
    security(("bearer_auth" = [])),
    params(RequiredUserIdParam),
    responses(
        (status = 200, description = "User banned", body = ObjectUpdated),
        (status = 403, description = "Missing capability", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn ban_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<RequiredUserIdParam>,
) -> AppResult<Json<ObjectUpdated>> {
    state.services.users.ban(&actor, params.user_id).await?;
    Ok(Json(ObjectUpdated::new()))
}
