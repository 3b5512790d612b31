//! API handlers for the Libris REST endpoints

pub mod api_keys;
pub mod books;
pub mod health;
pub mod jwt;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::User, AppState};

/// Header carrying a long-lived API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Extractor resolving a bearer JWT to the calling user
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid authorization header format".to_string())
            })?;

        let user = state.services.jwt.resolve_access(token).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Extractor resolving an `X-Api-Key` header to the calling user
pub struct ApiKeyUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ApiKeyUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing API key header".to_string()))?;

        let user = state.services.api_keys.resolve(key).await?;
        Ok(ApiKeyUser(user))
    }
}

/// Body returned when an object was created
#[derive(Serialize, ToSchema)]
pub struct ObjectCreated {
    pub message: String,
    pub id: i64,
}

impl ObjectCreated {
    pub fn new(id: i64) -> Self {
        Self {
            message: "Successfully created".to_string(),
            id,
        }
    }
}

/// Body returned when an object was updated
#[derive(Serialize, ToSchema)]
pub struct ObjectUpdated {
    pub message: String,
}

impl ObjectUpdated {
    pub fn new() -> Self {
        Self {
            message: "Successfully updated".to_string(),
        }
    }
}

/// Body returned when an object was deleted
#[derive(Serialize, ToSchema)]
pub struct ObjectDeleted {
    pub message: String,
}

impl ObjectDeleted {
    pub fn new() -> Self {
        Self {
            message: "Successfully deleted".to_string(),
        }
    }
}
