//! Google Books volume API client

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::BooksApiConfig,
    error::{AppError, AppResult},
    models::book::RemoteBook,
};

use super::{BookMetadataProvider, SearchParams};

/// Field restriction sent with every request; only what the local schema
/// consumes.
const VOLUME_FIELDS: &str = "id,volumeInfo(title,subtitle,authors,publishedDate,description,\
                             industryIdentifiers,categories,language)";

#[derive(Clone)]
pub struct GoogleBooks {
    client: reqwest::Client,
    volumes_url: String,
}

impl GoogleBooks {
    pub fn new(config: &BooksApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            volumes_url: format!("{}/{}/volumes", config.base_url, config.api_version),
        }
    }

    /// Compose the `q` expression from the filter set
    fn build_query(params: &SearchParams) -> String {
        let mut q = if let Some(ref gb_id) = params.gb_id {
            gb_id.clone()
        } else {
            params.query.clone().unwrap_or_default()
        };
        if let Some(ref intitle) = params.intitle {
            q.push_str("+intitle:");
            q.push_str(intitle);
        }
        if let Some(ref inauthor) = params.inauthor {
            q.push_str("+inauthor:");
            q.push_str(inauthor);
        }
        if let Some(ref isbn) = params.isbn {
            q.push_str("+isbn:");
            q.push_str(isbn);
        }
        if let Some(ref categories) = params.categories {
            q.push_str("+subject:");
            q.push_str(categories);
        }
        q
    }
}

#[async_trait]
impl BookMetadataProvider for GoogleBooks {
    async fn fetch_by_id(&self, gb_id: &str) -> AppResult<RemoteBook> {
        let url = format!("{}/{}", self.volumes_url, gb_id);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", VOLUME_FIELDS)])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Volume request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Volume {} not found", gb_id)));
        }
        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Volume request returned {}",
                response.status()
            )));
        }

        let volume: Volume = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Malformed volume response: {}", e)))?;

        Ok(volume.into_remote_book())
    }

    async fn search(&self, params: &SearchParams) -> AppResult<Vec<RemoteBook>> {
        let fields = format!("items({})", VOLUME_FIELDS);
        let response = self
            .client
            .get(&self.volumes_url)
            .query(&[("q", Self::build_query(params)), ("fields", fields)])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Search request returned {}",
                response.status()
            )));
        }

        let list: VolumeList = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Malformed search response: {}", e)))?;

        Ok(list
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Volume::into_remote_book)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct VolumeList {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    id: String,
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    description: Option<String>,
    language: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    #[serde(rename = "industryIdentifiers")]
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
    categories: Option<Vec<String>>,
    authors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

impl Volume {
    fn into_remote_book(self) -> RemoteBook {
        let info = self.volume_info;
        RemoteBook {
            gb_id: self.id,
            isbn: first_isbn10(info.industry_identifiers.as_deref()),
            title: info.title,
            subtitle: info.subtitle,
            description: info.description,
            language: info.language,
            pub_date: info.published_date,
            categories: info.categories.map(|c| c.join(", ")),
            authors: info.authors.map(|a| a.join(", ")),
        }
    }
}

/// First ISBN-10-typed identifier, if any; other identifier types are
/// ignored.
fn first_isbn10(identifiers: Option<&[IndustryIdentifier]>) -> Option<String> {
    identifiers?
        .iter()
        .find(|i| i.kind == "ISBN_10")
        .map(|i| i.identifier.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn volume(value: serde_json::Value) -> Volume {
        serde_json::from_value(value).expect("volume fixture")
    }

    #[test]
    fn maps_full_volume() {
        let v = volume(json!({
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "The Google Story",
                "subtitle": "Inside the Hottest Business",
                "authors": ["David A. Vise", "Mark Malseed"],
                "publishedDate": "2005-11-15",
                "description": "A business history.",
                "industryIdentifiers": [
                    {"type": "ISBN_13", "identifier": "9780553804577"},
                    {"type": "ISBN_10", "identifier": "055380457X"}
                ],
                "categories": ["Business & Economics", "Computers"],
                "language": "en"
            }
        }));

        let book = v.into_remote_book();
        assert_eq!(book.gb_id, "zyTCAlFPjgYC");
        assert_eq!(book.isbn.as_deref(), Some("055380457X"));
        assert_eq!(book.title.as_deref(), Some("The Google Story"));
        assert_eq!(
            book.authors.as_deref(),
            Some("David A. Vise, Mark Malseed")
        );
        assert_eq!(
            book.categories.as_deref(),
            Some("Business & Economics, Computers")
        );
        assert_eq!(book.language.as_deref(), Some("en"));
        assert_eq!(book.pub_date.as_deref(), Some("2005-11-15"));
    }

    #[test]
    fn skips_non_isbn10_identifiers() {
        let v = volume(json!({
            "id": "abc",
            "volumeInfo": {
                "industryIdentifiers": [
                    {"type": "ISBN_13", "identifier": "9780553804577"},
                    {"type": "OTHER", "identifier": "OCLC:123"}
                ]
            }
        }));
        assert_eq!(v.into_remote_book().isbn, None);
    }

    #[test]
    fn tolerates_missing_volume_info() {
        let v = volume(json!({"id": "bare"}));
        let book = v.into_remote_book();
        assert_eq!(book.gb_id, "bare");
        assert!(book.title.is_none());
        assert!(book.categories.is_none());
    }

    #[test]
    fn builds_query_from_text_filters() {
        let params = SearchParams {
            query: Some("rust".to_string()),
            intitle: Some("async".to_string()),
            inauthor: Some("klabnik".to_string()),
            ..Default::default()
        };
        assert_eq!(
            GoogleBooks::build_query(&params),
            "rust+intitle:async+inauthor:klabnik"
        );
    }

    #[test]
    fn builds_query_from_volume_id_alone() {
        let params = SearchParams {
            gb_id: Some("zyTCAlFPjgYC".to_string()),
            ..Default::default()
        };
        assert_eq!(GoogleBooks::build_query(&params), "zyTCAlFPjgYC");
    }
}
