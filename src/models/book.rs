//! Book model and library association types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Canonical local book record, keyed by the metadata provider's volume id.
///
/// `categories` and `authors` are free text, comma-joined the way the
/// provider reports them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub gb_id: String,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub pub_date: Option<String>,
    pub categories: Option<String>,
    pub authors: Option<String>,
}

impl Book {
    /// Category labels as individual trimmed strings
    pub fn category_labels(&self) -> Vec<&str> {
        self.categories
            .as_deref()
            .map(|c| c.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Book fields as mapped from a metadata-provider response. Search results
/// are served in this shape without touching storage; a library add on a
/// cache miss persists one of these as a new [`Book`] row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RemoteBook {
    pub gb_id: String,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub pub_date: Option<String>,
    pub categories: Option<String>,
    pub authors: Option<String>,
}

/// Many-to-many association between a book and a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryEntry {
    pub book_id: i64,
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(categories: Option<&str>) -> Book {
        Book {
            id: 1,
            gb_id: "zyTCAlFPjgYC".to_string(),
            isbn: None,
            title: None,
            subtitle: None,
            description: None,
            language: None,
            pub_date: None,
            categories: categories.map(str::to_string),
            authors: None,
        }
    }

    #[test]
    fn category_labels_split_and_trim() {
        let b = book(Some("Computers, Science Fiction,  History"));
        assert_eq!(
            b.category_labels(),
            vec!["Computers", "Science Fiction", "History"]
        );
    }

    #[test]
    fn category_labels_empty_when_absent() {
        assert!(book(None).category_labels().is_empty());
        assert!(book(Some("")).category_labels().is_empty());
    }
}
