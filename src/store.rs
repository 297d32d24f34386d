//! JSON-file backed catalog store.
//!
//! The file holds one pretty-printed JSON array of items and is the only
//! state: every operation re-reads it, and every mutation rewrites it whole.
//! Single writer, last write wins.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogItem, CatalogStats, ItemDraft};
use crate::error::{CatalogError, Result};

const TMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

/// Result of [`CatalogStore::prune_above_price`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PruneOutcome {
    pub removed: usize,
    pub remaining: usize,
    pub kept: Vec<CatalogItem>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every item. A missing file is an empty store.
    pub async fn load(&self) -> Result<Vec<CatalogItem>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing; treating as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(CatalogError::io(&self.path, err)),
        };
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file contents with `items`.
    ///
    /// Written to a sibling temp file first and renamed over the target, so a
    /// reader sees either the old array or the new one.
    pub async fn save(&self, items: &[CatalogItem]) -> Result<()> {
        let json = serde_json::to_vec_pretty(items).map_err(|source| CatalogError::Encode { source })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| CatalogError::io(parent, err))?;
        }

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, &json)
            .await
            .map_err(|err| CatalogError::io(&tmp, err))?;
        if let Err(err) = fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp store file");
            }
            return Err(CatalogError::io(&self.path, err));
        }

        info!(path = %self.path.display(), count = items.len(), "catalog store saved");
        Ok(())
    }

    /// Add one item built from `draft`, with a freshly assigned id.
    pub async fn append(&self, draft: ItemDraft) -> Result<CatalogItem> {
        let mut items = self.load().await?;
        let id = next_id(&items).ok_or_else(|| CatalogError::IdExhausted {
            path: self.path.clone(),
        })?;
        let item = draft.into_item(id);
        items.push(item.clone());
        self.save(&items).await?;
        info!(id = item.id(), total = items.len(), "item appended to catalog store");
        Ok(item)
    }

    /// Drop every item that is not priced at or below `threshold`.
    ///
    /// Items without a numeric price are dropped as well.
    pub async fn prune_above_price(&self, threshold: f64) -> Result<PruneOutcome> {
        let items = self.load().await?;
        let original = items.len();
        let kept: Vec<CatalogItem> = items
            .into_iter()
            .filter(|item| item.price_value().is_some_and(|p| p <= threshold))
            .collect();
        self.save(&kept).await?;

        let outcome = PruneOutcome {
            removed: original - kept.len(),
            remaining: kept.len(),
            kept,
        };
        info!(
            threshold,
            removed = outcome.removed,
            remaining = outcome.remaining,
            "catalog store pruned"
        );
        Ok(outcome)
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        let items = self.load().await?;
        Ok(CatalogStats::from_items(&items))
    }
}

/// One past the largest id in `items`; 1 for an empty list. `None` once the
/// largest id is `i64::MAX`.
pub fn next_id(items: &[CatalogItem]) -> Option<i64> {
    items
        .iter()
        .map(CatalogItem::id)
        .fold(0, i64::max)
        .checked_add(1)
}

fn tmp_path(final_path: &Path) -> PathBuf {
    let mut s = OsString::from(final_path.as_os_str());
    s.push(TMP_SUFFIX);
    PathBuf::from(s)
}
