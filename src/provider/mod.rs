//! External book-metadata provider.
//!
//! Business services depend on the [`BookMetadataProvider`] capability, never
//! on a concrete client; production wires in [`google_books::GoogleBooks`]
//! and tests substitute a double.

pub mod google_books;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{error::AppResult, models::book::RemoteBook};

/// Filter set accepted by the search endpoint. Either `gb_id` alone, or any
/// combination of the free-text fields.
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Provider volume id; mutually exclusive with every other field
    pub gb_id: Option<String>,
    pub query: Option<String>,
    pub intitle: Option<String>,
    pub inauthor: Option<String>,
    pub isbn: Option<String>,
    /// Comma-separated category labels
    pub categories: Option<String>,
}

impl SearchParams {
    /// True when any free-text filter is set
    pub fn has_text_filters(&self) -> bool {
        self.query.is_some()
            || self.intitle.is_some()
            || self.inauthor.is_some()
            || self.isbn.is_some()
            || self.categories.is_some()
    }

    /// Stable representation used as part of the response-cache key
    pub fn cache_token(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.gb_id.as_deref().unwrap_or(""),
            self.query.as_deref().unwrap_or(""),
            self.intitle.as_deref().unwrap_or(""),
            self.inauthor.as_deref().unwrap_or(""),
            self.isbn.as_deref().unwrap_or(""),
            self.categories.as_deref().unwrap_or(""),
        )
    }
}

/// Read access to the remote book catalog
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookMetadataProvider: Send + Sync {
    /// Fetch one volume by its provider id
    async fn fetch_by_id(&self, gb_id: &str) -> AppResult<RemoteBook>;

    /// Free-text search over the remote catalog
    async fn search(&self, params: &SearchParams) -> AppResult<Vec<RemoteBook>>;
}
