//! Typed HTTP client for the catalog API.
//!
//! This is what a frontend (or a script) uses to talk to the server: one
//! method per endpoint, with the admin key attached when one is set.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{
    CatalogEntry, CatalogPage, CatalogStats, EntryFlag, FilterOptions, NewCatalogEntry,
    RawCatalogQuery, SearchSuggestion, SeriesEpisodes,
};

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Errors returned by [`CatalogClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Body of `POST /catalog/{id}/download`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecorded {
    pub download_count: u64,
}

/// Client for one catalog server.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    admin_key: Option<String>,
}

impl CatalogClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_key: None,
        })
    }

    /// Attach the admin key to every request.
    pub fn with_admin_key(mut self, key: impl Into<String>) -> Self {
        self.admin_key = Some(key.into());
        self
    }

    pub fn has_admin_key(&self) -> bool {
        self.admin_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn entry_url(&self, id: &str, suffix: &str) -> String {
        self.url(&format!("/catalog/{}{}", urlencoding::encode(id), suffix))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_key {
            Some(key) => request.header("X-Admin-Key", key),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        debug!(status = status.as_u16(), message = %message, "Catalog API error");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// `GET /catalog`: one page of active entries.
    pub async fn list(&self, query: &RawCatalogQuery) -> Result<CatalogPage, ClientError> {
        self.send(self.client.get(self.url("/catalog")).query(query))
            .await
    }

    /// `GET /catalog/{id}`.
    pub async fn get(&self, id: &str) -> Result<CatalogEntry, ClientError> {
        self.send(self.client.get(self.entry_url(id, ""))).await
    }

    /// `GET /catalog/{id}/related`.
    pub async fn related(&self, id: &str) -> Result<Vec<CatalogEntry>, ClientError> {
        self.send(self.client.get(self.entry_url(id, "/related")))
            .await
    }

    /// `GET /catalog/{id}/episodes`.
    pub async fn episodes(&self, id: &str) -> Result<SeriesEpisodes, ClientError> {
        self.send(self.client.get(self.entry_url(id, "/episodes")))
            .await
    }

    /// `GET /catalog/search-suggestions?q=`.
    pub async fn suggestions(&self, q: &str) -> Result<Vec<SearchSuggestion>, ClientError> {
        self.send(
            self.client
                .get(self.url("/catalog/search-suggestions"))
                .query(&[("q", q)]),
        )
        .await
    }

    /// `POST /catalog/{id}/download`: returns the new download count.
    pub async fn record_download(&self, id: &str) -> Result<u64, ClientError> {
        let recorded: DownloadRecorded = self
            .send(self.client.post(self.entry_url(id, "/download")))
            .await?;
        Ok(recorded.download_count)
    }

    /// `GET /catalog/meta/filters`.
    pub async fn filter_options(&self) -> Result<FilterOptions, ClientError> {
        self.send(self.client.get(self.url("/catalog/meta/filters")))
            .await
    }

    /// `GET /catalog/meta/stats`.
    pub async fn stats(&self) -> Result<CatalogStats, ClientError> {
        self.send(self.client.get(self.url("/catalog/meta/stats")))
            .await
    }

    /// `GET /admin/verify`: whether the configured admin key is accepted.
    pub async fn verify_admin(&self) -> Result<bool, ClientError> {
        match self
            .send::<serde_json::Value>(self.client.get(self.url("/admin/verify")))
            .await
        {
            Ok(_) => Ok(true),
            Err(ClientError::Unauthorized(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `GET /admin/catalog`: like [`list`](Self::list) but including hidden entries.
    pub async fn admin_list(&self, query: &RawCatalogQuery) -> Result<CatalogPage, ClientError> {
        self.send(self.client.get(self.url("/admin/catalog")).query(query))
            .await
    }

    /// `POST /catalog`.
    pub async fn create(&self, entry: &NewCatalogEntry) -> Result<CatalogEntry, ClientError> {
        self.send(self.client.post(self.url("/catalog")).json(entry))
            .await
    }

    /// `PUT /catalog/{id}`.
    pub async fn update(
        &self,
        id: &str,
        entry: &NewCatalogEntry,
    ) -> Result<CatalogEntry, ClientError> {
        self.send(self.client.put(self.entry_url(id, "")).json(entry))
            .await
    }

    /// `DELETE /catalog/{id}`.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.client.delete(self.entry_url(id, "")))
            .await?;
        Ok(())
    }

    /// `PATCH /catalog/{id}/toggle-{flag}`.
    pub async fn toggle(&self, id: &str, flag: EntryFlag) -> Result<CatalogEntry, ClientError> {
        let suffix = format!("/toggle-{}", flag_segment(flag));
        self.send(self.client.patch(self.entry_url(id, &suffix)))
            .await
    }
}

fn flag_segment(flag: EntryFlag) -> &'static str {
    match flag {
        EntryFlag::Active => "active",
        EntryFlag::Trending => "trending",
        EntryFlag::Featured => "featured",
    }
}
