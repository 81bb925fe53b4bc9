//! Google Books volumes lookup.

use std::time::Duration;

use shelfscan_core::config::ApiConfig;
use shelfscan_core::isbn;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{BookInfo, VolumesResponse};

/// Looks up book metadata by ISBN.
#[derive(Debug, Clone)]
pub struct BooksClient {
    http: reqwest::Client,
    base_url: String,
}

impl BooksClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.books_url.trim().is_empty() {
            return Err(ApiError::Config("books_url is empty".into()));
        }

        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let base_url = config.books_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) fn volumes_url(&self, isbn13: &str) -> String {
        format!("{}/volumes?q=isbn:{}", self.base_url, isbn13)
    }

    /// Look up a book by ISBN (10 or 13 digits, separators allowed).
    ///
    /// Returns `Ok(None)` when the search has no results. The ISBN must
    /// already pass [`isbn::validate_isbn`] once cleaned.
    pub async fn lookup(&self, raw_isbn: &str) -> Result<Option<BookInfo>, ApiError> {
        let cleaned = isbn::clean_isbn(raw_isbn);
        if !isbn::validate_isbn(&cleaned) {
            return Err(ApiError::InvalidIsbn);
        }
        let isbn13 = isbn::to_isbn13(&cleaned);

        let resp = self.http.get(self.volumes_url(&isbn13)).send().await?;
        let resp = ApiClient::check_status(resp).await?;
        let volumes: VolumesResponse = resp.json().await?;

        let found = volumes
            .items
            .into_iter()
            .next()
            .map(|v| BookInfo::from_volume(v.volume_info, &cleaned));
        debug!(isbn = %isbn13, found = found.is_some(), "book lookup");
        Ok(found)
    }
}
