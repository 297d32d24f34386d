//! Remote product catalog access.
//!
//! [`CatalogApi`] is the capability set the rest of the crate consumes;
//! [`provider::StoreApiProvider`] implements it over HTTP.

pub mod provider;

use async_trait::async_trait;

use crate::catalog::{CatalogItem, ItemDraft};
use crate::error::Result;

pub use provider::StoreApiProvider;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CatalogItem>>;

    async fn list_limited(&self, limit: u32) -> Result<Vec<CatalogItem>>;

    /// The server assigns the id of the created item.
    async fn create(&self, draft: &ItemDraft) -> Result<CatalogItem>;

    async fn get_by_id(&self, id: i64) -> Result<CatalogItem>;

    async fn update(&self, id: i64, changes: &ItemDraft) -> Result<CatalogItem>;

    /// Returns the item as it was before deletion.
    async fn delete(&self, id: i64) -> Result<CatalogItem>;
}
