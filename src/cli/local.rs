use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::catalog::{CatalogStats, ItemDraft};
use crate::export;
use crate::remote::CatalogApi;
use crate::report::{self, Payload, StepReport};
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
    /// Fetch from the API (all, or the first `limit`) and overwrite the store.
    Mirror { limit: Option<u32> },
    Append(ItemDraft),
    Prune(f64),
    Stats { json: bool },
    Export { out: Option<PathBuf> },
}

/// Execute one store command. Failures propagate; the report is success-only.
pub async fn execute<A>(api: &A, store: &CatalogStore, cmd: LocalCommand) -> Result<StepReport>
where
    A: CatalogApi + ?Sized,
{
    let report = match cmd {
        LocalCommand::Mirror { limit } => {
            let items = match limit {
                Some(n) => api.list_limited(n).await?,
                None => api.list_all().await?,
            };
            store.save(&items).await?;
            StepReport::success(
                "Mirror products to local JSON",
                format!("{} products fetched", items.len()),
                Payload::Saved {
                    path: store.path().to_path_buf(),
                    count: items.len(),
                },
            )
        }
        LocalCommand::Append(draft) => {
            anyhow::ensure!(!draft.is_empty(), "append needs at least one item field");
            let item = store.append(draft).await?;
            StepReport::success("Append product to local store", "", Payload::Item(item))
        }
        LocalCommand::Prune(threshold) => {
            anyhow::ensure!(threshold.is_finite(), "price threshold must be a finite number");
            let outcome = store.prune_above_price(threshold).await?;
            StepReport::success(
                "Prune local products by price",
                "",
                Payload::Pruned { threshold, outcome },
            )
        }
        LocalCommand::Stats { .. } => {
            let items = store.load().await?;
            StepReport::success(
                "Local store stats",
                store.path().display().to_string(),
                Payload::Stats {
                    stats: CatalogStats::from_items(&items),
                    items,
                },
            )
        }
        LocalCommand::Export { out } => {
            let path = out.unwrap_or_else(export::default_export_path);
            let items = store.load().await?;
            let rows = export::write_csv(&items, &path)?;
            StepReport::success("Export local store to CSV", "", Payload::Exported { path, rows })
        }
    };
    Ok(report)
}

pub async fn run<A>(api: &A, cfg: LocalConfig, cmd: LocalCommand) -> Result<()>
where
    A: CatalogApi + ?Sized,
{
    let store = CatalogStore::new(cfg.store_path);
    if let LocalCommand::Stats { json: true } = cmd {
        let stats = store
            .stats()
            .await
            .with_context(|| format!("failed to read {}", store.path().display()))?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    let report = execute(api, &store, cmd)
        .await
        .with_context(|| format!("store operation on {} failed", store.path().display()))?;
    print!("{}", report::render_step(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use crate::error::{CatalogError, Result as CatalogResult};
    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    /// Serves a fixed list; every other call fails.
    struct ListOnly(Vec<CatalogItem>);

    fn unsupported() -> CatalogError {
        CatalogError::Request {
            url: "fake://products".into(),
            status: Some(405),
            message: "Method Not Allowed".into(),
        }
    }

    #[async_trait]
    impl CatalogApi for ListOnly {
        async fn list_all(&self) -> CatalogResult<Vec<CatalogItem>> {
            Ok(self.0.clone())
        }
        async fn list_limited(&self, limit: u32) -> CatalogResult<Vec<CatalogItem>> {
            Ok(self.0.iter().take(limit as usize).cloned().collect())
        }
        async fn create(&self, _: &ItemDraft) -> CatalogResult<CatalogItem> {
            Err(unsupported())
        }
        async fn get_by_id(&self, _: i64) -> CatalogResult<CatalogItem> {
            Err(unsupported())
        }
        async fn update(&self, _: i64, _: &ItemDraft) -> CatalogResult<CatalogItem> {
            Err(unsupported())
        }
        async fn delete(&self, _: i64) -> CatalogResult<CatalogItem> {
            Err(unsupported())
        }
    }

    fn api() -> ListOnly {
        ListOnly(
            serde_json::from_value(json!([
                {"id": 1, "title": "a", "price": 5},
                {"id": 2, "title": "b", "price": 50},
                {"id": 3, "title": "c", "price": 15}
            ]))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn mirror_limited_then_prune() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));

        let saved = execute(&api(), &store, LocalCommand::Mirror { limit: Some(2) })
            .await
            .unwrap();
        assert!(matches!(saved.payload(), Some(Payload::Saved { count: 2, .. })));

        let pruned = execute(&api(), &store, LocalCommand::Prune(10.0)).await.unwrap();
        match pruned.payload() {
            Some(Payload::Pruned { outcome, .. }) => {
                assert_eq!((outcome.removed, outcome.remaining), (1, 1));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[tokio::test]
    async fn append_and_export() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        execute(&api(), &store, LocalCommand::Mirror { limit: None })
            .await
            .unwrap();

        let appended = execute(&api(), &store, LocalCommand::Append(ItemDraft::titled("d")))
            .await
            .unwrap();
        assert!(matches!(appended.payload(), Some(Payload::Item(item)) if item.id() == 4));

        let out = dir.path().join("export.csv");
        let exported = execute(&api(), &store, LocalCommand::Export { out: Some(out.clone()) })
            .await
            .unwrap();
        assert!(matches!(exported.payload(), Some(Payload::Exported { rows: 4, .. })));
        assert!(out.exists());
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        assert!(execute(&api(), &store, LocalCommand::Prune(f64::NAN)).await.is_err());
        assert!(execute(&api(), &store, LocalCommand::Append(ItemDraft::default()))
            .await
            .is_err());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_store_surfaces_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        std::fs::write(store.path(), "oops").unwrap();
        let err = execute(&api(), &store, LocalCommand::Stats { json: false })
            .await
            .unwrap_err();
        let catalog_err = err.downcast_ref::<CatalogError>().unwrap();
        assert_eq!(catalog_err.kind(), "parse");
    }
}
