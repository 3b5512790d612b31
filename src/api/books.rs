//! Book search and personal library endpoints (API-key authenticated,
//! except search which is public like the catalog it proxies)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, RemoteBook},
    provider::SearchParams,
    services::cache::CacheService,
};

use super::{ApiKeyUser, ObjectCreated, ObjectDeleted};

/// Book-route responses are cached briefly; long enough to absorb bursts,
/// short enough that library edits show up immediately after.
const CACHE_TTL_SECONDS: u64 = 3;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IsbnParam {
    pub isbn: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookSelector {
    /// Local book id
    pub id: Option<i64>,
    /// Provider volume id; imports the book on first use
    pub gb_id: Option<String>,
}

/// Search the remote catalog
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching volumes", body = [RemoteBook]),
        (status = 400, description = "Invalid filter combination", body = crate::error::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn search(
    State(state): State<crate::AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<RemoteBook>>> {
    let cache_key = CacheService::response_key("books:search", &[&params.cache_token()]);
    if let Ok(Some(hit)) = state.services.cache.get_json::<Vec<RemoteBook>>(&cache_key).await {
        return Ok(Json(hit));
    }

    let results = state.services.books.search(&params).await?;

    if let Err(e) = state
        .services
        .cache
        .set_json(&cache_key, &results, CACHE_TTL_SECONDS)
        .await
    {
        tracing::warn!("Failed to cache search response: {}", e);
    }
    Ok(Json(results))
}

/// Look up a local book by ISBN, honoring the caller's excluded categories
#[utoipa::path(
    get,
    path = "/books/isbn",
    tag = "books",
    params(IsbnParam),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "No visible book with this ISBN", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_by_isbn(
    State(state): State<crate::AppState>,
    ApiKeyUser(actor): ApiKeyUser,
    Query(params): Query<IsbnParam>,
) -> AppResult<Json<Book>> {
    let cache_key = CacheService::response_key(
        "books:isbn",
        &[&actor.id.to_string(), &params.isbn],
    );
    if let Ok(Some(hit)) = state.services.cache.get_json::<Book>(&cache_key).await {
        return Ok(Json(hit));
    }

    let book = state
        .services
        .books
        .get_by_isbn(&actor, &params.isbn)
        .await?
        .ok_or_else(|| AppError::NotFound("Object(s) not found".to_string()))?;

    if let Err(e) = state
        .services
        .cache
        .set_json(&cache_key, &book, CACHE_TTL_SECONDS)
        .await
    {
        tracing::warn!("Failed to cache ISBN response: {}", e);
    }
    Ok(Json(book))
}

/// List the caller's library
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Books in the caller's library", body = [Book])
    )
)]
pub async fn get_user_library(
    State(state): State<crate::AppState>,
    ApiKeyUser(actor): ApiKeyUser,
) -> AppResult<Json<Vec<Book>>> {
    let cache_key = CacheService::response_key("books:library", &[&actor.id.to_string()]);
    if let Ok(Some(hit)) = state.services.cache.get_json::<Vec<Book>>(&cache_key).await {
        return Ok(Json(hit));
    }

    let books = state.services.library.get_user_library(&actor).await?;

    if let Err(e) = state
        .services
        .cache
        .set_json(&cache_key, &books, CACHE_TTL_SECONDS)
        .await
    {
        tracing::warn!("Failed to cache library response: {}", e);
    }
    Ok(Json(books))
}

/// Add a book to the caller's library by local id or provider volume id
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    params(BookSelector),
    responses(
        (status = 201, description = "Book added", body = ObjectCreated),
        (status = 400, description = "Bad selector combination", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already in library", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    ApiKeyUser(actor): ApiKeyUser,
    Query(selector): Query<BookSelector>,
) -> AppResult<(StatusCode, Json<ObjectCreated>)> {
    let book_id = state
        .services
        .library
        .add(&actor, selector.id, selector.gb_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ObjectCreated::new(book_id))))
}

/// Remove a book from the caller's library
#[utoipa::path(
    delete,
    path = "/books",
    tag = "books",
    params(BookSelector),
    responses(
        (status = 200, description = "Book removed", body = ObjectDeleted),
        (status = 400, description = "Bad selector combination", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    ApiKeyUser(actor): ApiKeyUser,
    Query(selector): Query<BookSelector>,
) -> AppResult<Json<ObjectDeleted>> {
    state
        .services
        .library
        .remove(&actor, selector.id, selector.gb_id.as_deref())
        .await?;
    Ok(Json(ObjectDeleted::new()))
}
