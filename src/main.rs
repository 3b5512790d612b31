//! Libris Server - personal library backend

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{
    api,
    config::AppConfig,
    middleware::request_context,
    provider::google_books::GoogleBooks,
    services::{cache::CacheService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize the response cache
    let cache = CacheService::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create the metadata provider and services
    let provider = Arc::new(GoogleBooks::new(&config.books_api));
    let services = Services::new(pool, config.auth.clone(), provider, cache);

    // Seed the first admin account on an empty database
    services
        .users
        .ensure_bootstrap_admin()
        .await
        .expect("Failed to seed bootstrap admin");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // JWT
        .route("/jwt/tokens", post(api::jwt::issue_tokens))
        .route("/jwt/refresh_token", post(api::jwt::refresh_tokens))
        // API keys
        .route(
            "/apikey",
            post(api::api_keys::create_api_key)
                .get(api::api_keys::list_api_keys)
                .delete(api::api_keys::delete_api_key),
        )
        // Users
        .route(
            "/users",
            post(api::users::create_user)
                .get(api::users::get_user)
                .patch(api::users::update_user),
        )
        .route("/users/permissions", put(api::users::update_user_permissions))
        .route("/users/ban", post(api::users::ban_user))
        // Books
        .route("/books/search", get(api::books::search))
        .route("/books/isbn", get(api::books::get_by_isbn))
        .route(
            "/books",
            get(api::books::get_user_library)
                .post(api::books::add_book)
                .delete(api::books::remove_book),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
