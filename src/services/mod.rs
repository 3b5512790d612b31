//! Business logic services

pub mod api_keys;
pub mod books;
pub mod cache;
pub mod jwt;
pub mod password;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::{config::AuthConfig, provider::BookMetadataProvider};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub jwt: jwt::JwtService,
    pub api_keys: api_keys::ApiKeyService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub library: books::LibraryService,
    pub cache: cache::CacheService,
}

impl Services {
    /// Create all services over the shared pool, provider and cache
    pub fn new(
        pool: Pool<Postgres>,
        auth_config: AuthConfig,
        provider: Arc<dyn BookMetadataProvider>,
        cache: cache::CacheService,
    ) -> Self {
        Self {
            jwt: jwt::JwtService::new(pool.clone(), auth_config.clone()),
            api_keys: api_keys::ApiKeyService::new(pool.clone(), auth_config),
            users: users::UsersService::new(pool.clone()),
            books: books::BooksService::new(pool.clone(), provider.clone()),
            library: books::LibraryService::new(pool, provider),
            cache,
        }
    }
}
