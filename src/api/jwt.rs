//! JWT token endpoints

use axum::{extract::State, Form, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::TokenPair};

/// Password grant form
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Refresh grant form
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshForm {
    pub grant_type: String,
    pub refresh_token: String,
}

/// Exchange a username/password pair for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/jwt/tokens",
    tag = "jwt",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_tokens(
    State(state): State<crate::AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenPair>> {
    let user = state
        .services
        .jwt
        .authenticate(&form.username, &form.password)
        .await?;
    Ok(Json(state.services.jwt.create_tokens(&user)?))
}

/// Exchange a refresh token for a fresh token pair
#[utoipa::path(
    post,
    path = "/jwt/refresh_token",
    tag = "jwt",
    request_body(content = RefreshForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 401, description = "Invalid refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh_tokens(
    State(state): State<crate::AppState>,
    Form(form): Form<RefreshForm>,
) -> AppResult<Json<TokenPair>> {
    let user = state
        .services
        .jwt
        .resolve_refresh(&form.grant_type, &form.refresh_token)
        .await?;
    Ok(Json(state.services.jwt.create_tokens(&user)?))
}
