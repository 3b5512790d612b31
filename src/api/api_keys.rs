//! API key endpoints (issued and managed under a JWT session)

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::api_key::ApiKeyInfo};

use super::{AuthenticatedUser, ObjectDeleted};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateKeyParams {
    /// Last day the key is valid (inclusive)
    pub expire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeyIdParam {
    pub id: i64,
}

/// Body carrying a freshly issued key. The plaintext appears here and
/// nowhere else.
#[derive(Serialize, ToSchema)]
pub struct KeyCreated {
    pub message: String,
    pub key: String,
}

/// Issue a new API key for the caller
#[utoipa::path(
    post,
    path = "/apikey",
    tag = "apikey",
    security(("bearer_auth" = [])),
    params(CreateKeyParams),
    responses(
        (status = 200, description = "Key issued; plaintext is not retrievable again", body = KeyCreated),
        (status = 400, description = "Expiration in the past", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_api_key(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<CreateKeyParams>,
) -> AppResult<Json<KeyCreated>> {
    let key = state
        .services
        .api_keys
        .create(&actor, params.expire_date)
        .await?;
    Ok(Json(KeyCreated {
        message: "Successfully created".to_string(),
        key,
    }))
}

/// List the caller's API keys (plaintext omitted)
#[utoipa::path(
    get,
    path = "/apikey",
    tag = "apikey",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Key records", body = [ApiKeyInfo])
    )
)]
pub async fn list_api_keys(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> AppResult<Json<Vec<ApiKeyInfo>>> {
    let keys = state.services.api_keys.list(&actor).await?;
    Ok(Json(keys))
}

/// Delete one of the caller's API keys
#[utoipa::path(
    delete,
    path = "/apikey",
    tag = "apikey",
    security(("bearer_auth" = [])),
    params(KeyIdParam),
    responses(
        (status = 200, description = "Key deleted", body = ObjectDeleted),
        (status = 403, description = "Key belongs to another user", body = crate::error::ErrorResponse),
        (status = 404, description = "Key not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_api_key(
    State(state): State<crate::AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<KeyIdParam>,
) -> AppResult<Json<ObjectDeleted>> {
    state.services.api_keys.delete(&actor, params.id).await?;
    Ok(Json(ObjectDeleted::new()))
}
