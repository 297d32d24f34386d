use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::CatalogApi;
use crate::catalog::{CatalogItem, ItemDraft};
use crate::error::{CatalogError, Result};

pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

/// HTTP client for a fake-store style products API.
///
/// Endpoints (relative to the base URL):
/// - GET    /products            - every product
/// - GET    /products?limit=n    - first n products
/// - POST   /products            - create, server assigns the id
/// - GET    /products/{id}       - one product
/// - PUT    /products/{id}       - replace fields of a product
/// - DELETE /products/{id}       - delete, echoes the removed product
#[derive(Debug, Clone)]
pub struct StoreApiProvider {
    base_url: String,
    http: Client,
}

impl StoreApiProvider {
    pub fn new(base_url: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL);
        let http = Client::builder()
            .user_agent("catalog-mirror/0.1")
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|err| CatalogError::Request {
                url: base_url.to_string(),
                status: None,
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self::with_client(base_url, http))
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn product_url(&self, id: i64) -> String {
        format!("{}/products/{}", self.base_url, id)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, url: &str) -> Result<T> {
        debug!(url, "catalog request");
        let resp = req
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| CatalogError::Request {
                url: url.to_string(),
                status: None,
                message: err.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{reason}; body: {body}")
            };
            return Err(CatalogError::Request {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message,
            });
        }

        let bytes = resp.bytes().await.map_err(|err| CatalogError::Request {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {err}"),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| CatalogError::Request {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("response body is not a valid catalog payload: {err}"),
        })
    }
}

#[async_trait]
impl CatalogApi for StoreApiProvider {
    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let url = self.products_url();
        self.send_json(self.http.get(&url), &url).await
    }

    async fn list_limited(&self, limit: u32) -> Result<Vec<CatalogItem>> {
        let url = format!("{}?limit={}", self.products_url(), limit);
        self.send_json(self.http.get(&url), &url).await
    }

    async fn create(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        let url = self.products_url();
        self.send_json(self.http.post(&url).json(draft), &url).await
    }

    async fn get_by_id(&self, id: i64) -> Result<CatalogItem> {
        let url = self.product_url(id);
        self.send_json(self.http.get(&url), &url).await
    }

    async fn update(&self, id: i64, changes: &ItemDraft) -> Result<CatalogItem> {
        let url = self.product_url(id);
        self.send_json(self.http.put(&url).json(changes), &url).await
    }

    async fn delete(&self, id: i64) -> Result<CatalogItem> {
        let url = self.product_url(id);
        self.send_json(self.http.delete(&url), &url).await
    }
}
