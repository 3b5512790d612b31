//! JWT issuance and bearer-token resolution

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{TokenClaims, TokenKind, TokenPair, User},
    repository::UnitOfWork,
    services::password::PasswordService,
};

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Clone)]
pub struct JwtService {
    pool: Pool<Postgres>,
    config: AuthConfig,
}

impl JwtService {
    pub fn new(pool: Pool<Postgres>, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Check a username/password pair. Absent user and wrong password
    /// collapse to the same failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let user = uow.users().get_by_username(username).await?;
        uow.commit().await?;

        let user = user.ok_or_else(AppError::bad_credentials)?;
        if !PasswordService::verify(password, &user.password) {
            return Err(AppError::bad_credentials());
        }
        if user.banned {
            return Err(AppError::Unauthorized("Account is banned".to_string()));
        }
        Ok(user)
    }

    /// Issue an access/refresh pair for a user. Both tokens carry the same
    /// subject and issue time; expirations and the `kind` claim differ.
    pub fn create_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let now = Utc::now().timestamp();

        let access = TokenClaims {
            sub: user.username.clone(),
            kind: TokenKind::Access,
            exp: now + self.config.access_token_expire_minutes as i64 * 60,
            iat: now,
        };
        let refresh = TokenClaims {
            sub: user.username.clone(),
            kind: TokenKind::Refresh,
            exp: now + self.config.refresh_token_expire_hours as i64 * 3600,
            iat: now,
        };

        Ok(TokenPair {
            token_type: TOKEN_TYPE.to_string(),
            access_token: access
                .encode(&self.config.jwt_secret)
                .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?,
            refresh_token: refresh
                .encode(&self.config.jwt_secret)
                .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?,
        })
    }

    /// Resolve an access token to its (not banned) subject
    pub async fn resolve_access(&self, token: &str) -> AppResult<User> {
        let claims = verify_claims(token, &self.config.jwt_secret, TokenKind::Access)?;
        self.resolve_subject(&claims).await
    }

    /// Resolve a refresh token, gated by the explicit grant type
    pub async fn resolve_refresh(&self, grant_type: &str, token: &str) -> AppResult<User> {
        if grant_type != "refresh_token" {
            return Err(AppError::Unauthorized(
                "Expected 'grant_type' parameter with 'refresh_token' value".to_string(),
            ));
        }
        let claims = verify_claims(token, &self.config.jwt_secret, TokenKind::Refresh)?;
        self.resolve_subject(&claims).await
    }

    async fn resolve_subject(&self, claims: &TokenClaims) -> AppResult<User> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let user = uow.users().get_by_username(&claims.sub).await?;
        uow.commit().await?;

        let user = user.ok_or_else(AppError::invalid_token)?;
        if user.banned {
            return Err(AppError::invalid_token());
        }
        Ok(user)
    }
}

/// Signature, expiry and kind checks; everything collapses to Unauthorized.
fn verify_claims(token: &str, secret: &str, expected: TokenKind) -> AppResult<TokenClaims> {
    let claims = TokenClaims::decode(token, secret).map_err(|_| AppError::invalid_token())?;
    if claims.kind != expected {
        return Err(AppError::invalid_token());
    }
    Ok(claims)
}
