use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::catalog::{query, CatalogItem, ItemDraft};
use crate::remote::{CatalogApi, StoreApiProvider};

#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    /// Base URL of the products API (defaults to the public fake store).
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Filters applied to the full remote list by `search`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub title: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    List,
    Limited(u32),
    Get(i64),
    Create(ItemDraft),
    Update(i64, ItemDraft),
    Delete(i64),
    Search(SearchFilters),
}

impl RemoteConfig {
    pub fn provider(&self) -> Result<StoreApiProvider> {
        StoreApiProvider::new(self.api_base.as_deref(), self.timeout_secs)
            .context("failed to build catalog API client")
    }
}

fn apply_filters(items: Vec<CatalogItem>, filters: &SearchFilters) -> Vec<CatalogItem> {
    let mut found = items;
    if let Some(category) = &filters.category {
        found = query::by_category(&found, category).into_iter().cloned().collect();
    }
    if let Some(title) = &filters.title {
        found = query::by_title(&found, title).into_iter().cloned().collect();
    }
    if let Some(rate) = filters.min_rating {
        found = query::min_rating(&found, rate).into_iter().cloned().collect();
    }
    found
}

/// Execute one remote command and return its JSON result.
pub async fn execute<A>(api: &A, cmd: RemoteCommand) -> Result<Value>
where
    A: CatalogApi + ?Sized,
{
    let value = match cmd {
        RemoteCommand::List => serde_json::to_value(api.list_all().await?)?,
        RemoteCommand::Limited(n) => serde_json::to_value(api.list_limited(n).await?)?,
        RemoteCommand::Get(id) => serde_json::to_value(api.get_by_id(id).await?)?,
        RemoteCommand::Create(draft) => {
            anyhow::ensure!(!draft.is_empty(), "create needs at least one item field");
            serde_json::to_value(api.create(&draft).await?)?
        }
        RemoteCommand::Update(id, draft) => {
            anyhow::ensure!(!draft.is_empty(), "update needs at least one item field");
            serde_json::to_value(api.update(id, &draft).await?)?
        }
        RemoteCommand::Delete(id) => serde_json::to_value(api.delete(id).await?)?,
        RemoteCommand::Search(filters) => {
            let found = apply_filters(api.list_all().await?, &filters);
            json!({ "count": found.len(), "items": found })
        }
    };
    Ok(value)
}

pub async fn run(cfg: RemoteConfig, cmd: RemoteCommand) -> Result<()> {
    let api = cfg.provider()?;
    info!(base = api.base_url(), command = ?cmd, "remote catalog command");
    let out = execute(&api, cmd).await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
