//! Book search, local catalog lookups and personal library curation

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, RemoteBook},
        user::User,
    },
    provider::{BookMetadataProvider, SearchParams},
    repository::UnitOfWork,
};

#[derive(Clone)]
pub struct BooksService {
    pool: Pool<Postgres>,
    provider: Arc<dyn BookMetadataProvider>,
}

impl BooksService {
    pub fn new(pool: Pool<Postgres>, provider: Arc<dyn BookMetadataProvider>) -> Self {
        Self { pool, provider }
    }

    /// Remote catalog search. Either `gb_id` alone or at least one text
    /// filter; nothing is persisted.
    pub async fn search(&self, params: &SearchParams) -> AppResult<Vec<RemoteBook>> {
        match (params.gb_id.is_some(), params.has_text_filters()) {
            (false, false) => Err(AppError::Validation(
                "At least one search parameter is required".to_string(),
            )),
            (true, true) => Err(AppError::Validation(
                "If gb_id is passed, the remaining fields must be empty".to_string(),
            )),
            _ => self.provider.search(params).await,
        }
    }

    /// Local lookup by ISBN. A book carrying any of the actor's excluded
    /// categories is invisible to them: the result is absent, not an error.
    pub async fn get_by_isbn(&self, actor: &User, isbn: &str) -> AppResult<Option<Book>> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let book = uow.books().get_by_isbn(isbn).await?;
        uow.commit().await?;

        Ok(book.filter(|b| !hidden_from(b, actor)))
    }
}

#[derive(Clone)]
pub struct LibraryService {
    pool: Pool<Postgres>,
    provider: Arc<dyn BookMetadataProvider>,
}

impl LibraryService {
    pub fn new(pool: Pool<Postgres>, provider: Arc<dyn BookMetadataProvider>) -> Self {
        Self { pool, provider }
    }

    /// All books in the actor's library
    pub async fn get_user_library(&self, actor: &User) -> AppResult<Vec<Book>> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let books = uow.books().get_user_library(actor.id).await?;
        uow.commit().await?;

        Ok(books)
    }

    /// Add a book to the actor's library, importing it from the provider on
    /// a first-time `gb_id`. Returns the local book id. A second add of the
    /// same book is a duplicate error; the association count stays at one.
    pub async fn add(
        &self,
        actor: &User,
        id: Option<i64>,
        gb_id: Option<&str>,
    ) -> AppResult<i64> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let book_id = self.resolve_book_id(&mut uow, id, gb_id).await?;
        if uow
            .library()
            .get_association(book_id, actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::Duplicate(
                "This book is already in the user's library".to_string(),
            ));
        }
        uow.library().add_association(book_id, actor.id).await?;

        uow.commit().await?;
        Ok(book_id)
    }

    /// Remove a book from the actor's library. Resolution works exactly as
    /// in [`Self::add`]; removing an absent association is a no-op.
    pub async fn remove(
        &self,
        actor: &User,
        id: Option<i64>,
        gb_id: Option<&str>,
    ) -> AppResult<()> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let book_id = self.resolve_book_id(&mut uow, id, gb_id).await?;
        uow.library().del_association(book_id, actor.id).await?;

        uow.commit().await?;
        Ok(())
    }

    /// Map an `id`/`gb_id` selector to a local book id. Exactly one selector
    /// must be given; a by-id miss is NotFound, a by-gb_id miss falls back
    /// to the provider and caches the result locally.
    async fn resolve_book_id(
        &self,
        uow: &mut UnitOfWork,
        id: Option<i64>,
        gb_id: Option<&str>,
    ) -> AppResult<i64> {
        match (id, gb_id) {
            (None, None) => Err(AppError::Validation(
                "At least one of the parameters id or gb_id is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Pass either id or gb_id, not both".to_string(),
            )),
            (Some(id), None) => {
                let book = uow.books().get_by_id(id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Book with id={} not found. Try adding by gb_id", id))
                })?;
                Ok(book.id)
            }
            (None, Some(gb_id)) => {
                if let Some(book) = uow.books().get_by_gb_id(gb_id).await? {
                    Ok(book.id)
                } else {
                    let remote = self.provider.fetch_by_id(gb_id).await?;
                    uow.books().upsert_remote(&remote).await
                }
            }
        }
    }
}

/// True when any of the book's categories appears in the actor's exclusion
/// list.
fn hidden_from(book: &Book, actor: &User) -> bool {
    book.category_labels()
        .iter()
        .any(|label| actor.excluded_categories.iter().any(|e| e == label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Permissions;
    use crate::provider::MockBookMetadataProvider;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> Pool<Postgres> {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    fn actor(excluded: &[&str]) -> User {
        User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: String::new(),
            banned: false,
            permissions: Permissions::default(),
            excluded_categories: excluded.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn book(categories: Option<&str>) -> Book {
        Book {
            id: 10,
            gb_id: "zyTCAlFPjgYC".to_string(),
            isbn: Some("055380457X".to_string()),
            title: Some("The Google Story".to_string()),
            subtitle: None,
            description: None,
            language: Some("en".to_string()),
            pub_date: None,
            categories: categories.map(str::to_string),
            authors: None,
        }
    }

    #[tokio::test]
    async fn search_requires_at_least_one_parameter() {
        // The provider would panic if reached; validation short-circuits.
        let svc = BooksService::new(lazy_pool(), Arc::new(MockBookMetadataProvider::new()));
        let err = svc.search(&SearchParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn search_rejects_gb_id_combined_with_filters() {
        let svc = BooksService::new(lazy_pool(), Arc::new(MockBookMetadataProvider::new()));
        let params = SearchParams {
            gb_id: Some("X".to_string()),
            query: Some("Y".to_string()),
            ..Default::default()
        };
        let err = svc.search(&params).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn search_accepts_gb_id_alone() {
        let mut provider = MockBookMetadataProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_| Ok(vec![]));
        let svc = BooksService::new(lazy_pool(), Arc::new(provider));

        let params = SearchParams {
            gb_id: Some("X".to_string()),
            ..Default::default()
        };
        assert!(svc.search(&params).await.is_ok());
    }

    #[tokio::test]
    async fn search_accepts_text_filters_alone() {
        let mut provider = MockBookMetadataProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_| Ok(vec![]));
        let svc = BooksService::new(lazy_pool(), Arc::new(provider));

        let params = SearchParams {
            query: Some("Y".to_string()),
            ..Default::default()
        };
        assert!(svc.search(&params).await.is_ok());
    }

    #[test]
    fn book_with_excluded_category_is_hidden() {
        let b = book(Some("Computers, Business & Economics"));
        assert!(hidden_from(&b, &actor(&["Computers"])));
        assert!(!hidden_from(&b, &actor(&["Poetry"])));
        assert!(!hidden_from(&b, &actor(&[])));
    }

    #[test]
    fn book_without_categories_is_never_hidden() {
        let b = book(None);
        assert!(!hidden_from(&b, &actor(&["Computers"])));
    }
}
