//! Redis-backed response cache for the book routes

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CacheService {
    client: Client,
}

impl CacheService {
    /// Create a new cache service and verify the connection
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch and deserialize a cached value, if present
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read cache entry: {}", e)))?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json).ok()),
            None => Ok(None),
        }
    }

    /// Serialize and store a value with a TTL in seconds
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize cache entry: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cache entry: {}", e)))?;

        Ok(())
    }

    /// Build a cache key from a route name and its identifying parts.
    /// Session and transaction state never participates in the key.
    pub fn response_key(route: &str, parts: &[&str]) -> String {
        let mut hasher = DefaultHasher::new();
        for part in parts {
            part.hash(&mut hasher);
        }
        format!("libris:{}:{:x}", route, hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_key_is_deterministic_per_parameter_set() {
        let a = CacheService::response_key("search", &["rust", "", "1"]);
        let b = CacheService::response_key("search", &["rust", "", "1"]);
        let c = CacheService::response_key("search", &["rust", "x", "1"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn response_key_separates_routes() {
        let a = CacheService::response_key("search", &["q"]);
        let b = CacheService::response_key("isbn", &["q"]);
        assert_ne!(a, b);
    }
}
