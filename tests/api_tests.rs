//! API integration tests
//!
//! These run against a live server (database, Redis and the seeded
//! bootstrap admin). Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an access token for the bootstrap admin
async fn get_access_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/jwt/tokens", BASE_URL))
        .form(&[("username", "admin"), ("password", "admin")])
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

/// Helper to create an API key for the bootstrap admin
async fn get_api_key(client: &Client) -> String {
    let token = get_access_token(client).await;
    let expire = (Utc::now() + Duration::days(7)).date_naive();

    let response = client
        .post(format!("{}/apikey?expire_date={}", BASE_URL, expire))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send key request");

    let body: Value = response.json().await.expect("Failed to parse key response");
    body["key"].as_str().expect("No key in response").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_issues_token_pair() {
    let client = Client::new();

    let response = client
        .post(format!("{}/jwt/tokens", BASE_URL))
        .form(&[("username", "admin"), ("password", "admin")])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/jwt/tokens", BASE_URL))
        .form(&[("username", "admin"), ("password", "wrong")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_rejects_access_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/jwt/tokens", BASE_URL))
        .form(&[("username", "admin"), ("password", "admin")])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let access_token = body["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    // An access token where a refresh token is required fails.
    let response = client
        .post(format!("{}/jwt/refresh_token", BASE_URL))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", access_token.as_str()),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // The wrong grant type fails even with the right token.
    let response = client
        .post(format!("{}/jwt/refresh_token", BASE_URL))
        .form(&[
            ("grant_type", "password"),
            ("refresh_token", refresh_token.as_str()),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // The real refresh flow succeeds.
    let response = client
        .post(format!("{}/jwt/refresh_token", BASE_URL))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_users_require_authentication() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_self() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    // The password hash never leaves the server.
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_create_user_then_duplicate_conflicts() {
    let client = Client::new();
    let token = get_access_token(&client).await;

    let payload = json!({
        "name": "Test User",
        "email": "testuser@example.com",
        "username": "testuser",
        "password": "testpass",
        "permissions": {
            "can_view_users": false,
            "can_add_users": false,
            "can_ban_users": false,
            "can_delete_users": false,
            "can_edit_user_profile": false,
            "can_edit_user_permissions": false,
            "super_user": false
        }
    });

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");

    if response.status() == 201 {
        // A second creation with the same username must conflict.
        let response = client
            .post(format!("{}/users", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 409);
    }
}

#[tokio::test]
#[ignore]
async fn test_api_key_lifecycle() {
    let client = Client::new();
    let token = get_access_token(&client).await;
    let expire = (Utc::now() + Duration::days(1)).date_naive();

    // Issue a key
    let response = client
        .post(format!("{}/apikey?expire_date={}", BASE_URL, expire))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["key"].is_string());

    // Listing never exposes the plaintext key
    let response = client
        .get(format!("{}/apikey", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let list: Value = response.json().await.expect("Failed to parse response");
    let records = list.as_array().expect("Expected an array");
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.get("key").is_none()));

    // Delete the newest key
    let id = records.last().unwrap()["id"].as_i64().unwrap();
    let response = client
        .delete(format!("{}/apikey?id={}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_api_key_with_past_expiration_is_rejected() {
    let client = Client::new();
    let token = get_access_token(&client).await;
    let expire = (Utc::now() - Duration::days(1)).date_naive();

    let response = client
        .post(format!("{}/apikey?expire_date={}", BASE_URL, expire))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_search_filter_validation() {
    let client = Client::new();

    // No parameters at all
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // gb_id combined with a text filter
    let response = client
        .get(format!("{}/books/search?gb_id=X&query=Y", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_library_requires_api_key() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_library_add_conflicts() {
    let client = Client::new();
    let api_key = get_api_key(&client).await;

    // Import a known volume into the library
    let response = client
        .post(format!("{}/books?gb_id=zyTCAlFPjgYC", BASE_URL))
        .header("X-Api-Key", &api_key)
        .send()
        .await
        .expect("Failed to send request");

    if response.status() == 201 {
        // The second add of the same book must conflict.
        let response = client
            .post(format!("{}/books?gb_id=zyTCAlFPjgYC", BASE_URL))
            .header("X-Api-Key", &api_key)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 409);

        // Cleanup
        let _ = client
            .delete(format!("{}/books?gb_id=zyTCAlFPjgYC", BASE_URL))
            .header("X-Api-Key", &api_key)
            .send()
            .await;
    }
}

#[tokio::test]
#[ignore]
async fn test_library_selector_validation() {
    let client = Client::new();
    let api_key = get_api_key(&client).await;

    // Neither id nor gb_id
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("X-Api-Key", &api_key)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}
