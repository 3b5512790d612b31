//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, api_keys, books, health, jwt, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Personal library backend with Google Books import",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // JWT
        jwt::issue_tokens,
        jwt::refresh_tokens,
        // API keys
        api_keys::create_api_key,
        api_keys::list_api_keys,
        api_keys::delete_api_key,
        // Users
        users::create_user,
        users::get_user,
        users::update_user,
        users::update_user_permissions,
        users::ban_user,
        // Books
        books::search,
        books::get_by_isbn,
        books::get_user_library,
        books::add_book,
        books::remove_book,
    ),
    components(
        schemas(
            // JWT
            jwt::LoginForm,
            jwt::RefreshForm,
            crate::models::user::TokenPair,
            // API keys
            api_keys::KeyCreated,
            crate::models::api_key::ApiKeyInfo,
            // Users
            crate::models::user::User,
            crate::models::user::Permissions,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::RemoteBook,
            crate::models::book::LibraryEntry,
            // Shared responses
            api::ObjectCreated,
            api::ObjectUpdated,
            api::ObjectDeleted,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "jwt", description = "JWT token issuance"),
        (name = "apikey", description = "API key management"),
        (name = "users", description = "User management"),
        (name = "books", description = "Book search and personal library")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
