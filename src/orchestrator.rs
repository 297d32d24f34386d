//! End-to-end walkthrough: remote catalog calls followed by local store
//! maintenance, one awaited step at a time.
//!
//! A failed step is reported and the run moves on; nothing here aborts early.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::{query, CatalogItem, CatalogStats, ItemDraft};
use crate::error::Result;
use crate::export;
use crate::remote::CatalogApi;
use crate::report::{Payload, StepReport};
use crate::store::CatalogStore;
use crate::util::env::CatalogConfig;

/// What the walkthrough sends and which thresholds it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughPlan {
    pub limit: u32,
    pub price_ceiling: f64,
    pub step_delay: Duration,
    pub export_path: Option<PathBuf>,
    pub remote_draft: ItemDraft,
    pub lookup_id: i64,
    pub delete_id: i64,
    pub update_id: i64,
    pub update_draft: ItemDraft,
    pub local_draft: ItemDraft,
    pub category: String,
    pub title_query: String,
    pub min_rating: f64,
}

impl Default for WalkthroughPlan {
    fn default() -> Self {
        Self {
            limit: 5,
            price_ceiling: 30.0,
            step_delay: Duration::ZERO,
            export_path: None,
            remote_draft: ItemDraft::titled("Sample product (API)")
                .with_price(25.99)
                .with_description("Product created by the catalog walkthrough")
                .with_image("https://fakestoreapi.com/img/placeholder.jpg")
                .with_category("test"),
            lookup_id: 1,
            delete_id: 1,
            update_id: 2,
            update_draft: ItemDraft::titled("Modified product (API)")
                .with_price(15.99)
                .with_description("Product modified by the catalog walkthrough"),
            local_draft: ItemDraft::titled("Local product")
                .with_price(45.0)
                .with_description("Product appended straight to the local store")
                .with_category("local"),
            category: "electronics".to_string(),
            title_query: "shirt".to_string(),
            min_rating: 4.0,
        }
    }
}

impl WalkthroughPlan {
    pub fn from_config(cfg: &CatalogConfig) -> Self {
        Self {
            limit: cfg.list_limit,
            price_ceiling: cfg.price_ceiling,
            step_delay: Duration::from_millis(cfg.step_delay_ms),
            export_path: cfg.export_path.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub steps: Vec<StepReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.steps.len() - self.succeeded()
    }
}

struct Recorder<F> {
    steps: Vec<StepReport>,
    sink: F,
    delay: Duration,
}

impl<F: FnMut(&StepReport)> Recorder<F> {
    /// Turn `result` into a report, hand it to the sink and keep it. Returns
    /// the success value for later steps.
    async fn record<T>(
        &mut self,
        operation: &str,
        result: Result<T>,
        on_ok: impl FnOnce(&T) -> (String, Payload),
    ) -> Option<T> {
        let (report, value) = match result {
            Ok(value) => {
                let (detail, payload) = on_ok(&value);
                info!(operation, "walkthrough step succeeded");
                (StepReport::success(operation, detail, payload), Some(value))
            }
            Err(err) => {
                warn!(operation, error = %err, "walkthrough step failed");
                (StepReport::failure(operation, &err), None)
            }
        };
        (self.sink)(&report);
        self.steps.push(report);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        value
    }
}

async fn snapshot(store: &CatalogStore) -> Result<(CatalogStats, Vec<CatalogItem>)> {
    let items = store.load().await?;
    Ok((CatalogStats::from_items(&items), items))
}

fn stats_payload(snap: &(CatalogStats, Vec<CatalogItem>)) -> (String, Payload) {
    (
        format!("{} products in the local store", snap.1.len()),
        Payload::Stats {
            stats: snap.0.clone(),
            items: snap.1.clone(),
        },
    )
}

fn matches_payload(found: Vec<&CatalogItem>, what: String) -> (String, Payload) {
    let items: Vec<CatalogItem> = found.into_iter().cloned().collect();
    (format!("{} products {what}", items.len()), Payload::Items(items))
}

/// Run every step in order, reporting each one to `sink` as it completes.
pub async fn run_walkthrough<A, F>(
    api: &A,
    store: &CatalogStore,
    plan: &WalkthroughPlan,
    sink: F,
) -> RunSummary
where
    A: CatalogApi + ?Sized,
    F: FnMut(&StepReport),
{
    let mut rec = Recorder {
        steps: Vec::new(),
        sink,
        delay: plan.step_delay,
    };

    let all = rec
        .record("GET all products (API)", api.list_all().await, |items| {
            (
                format!("{} products fetched", items.len()),
                Payload::Items(items.clone()),
            )
        })
        .await;

    let limited = rec
        .record(
            "GET limited products (API)",
            api.list_limited(plan.limit).await,
            |items| {
                (
                    format!("{} products with limit {}", items.len(), plan.limit),
                    Payload::Items(items.clone()),
                )
            },
        )
        .await;

    if let Some(items) = limited {
        rec.record("Save products to local JSON", store.save(&items).await, |_| {
            (
                format!("{} products saved", items.len()),
                Payload::Saved {
                    path: store.path().to_path_buf(),
                    count: items.len(),
                },
            )
        })
        .await;
    } else {
        info!("limited list unavailable; skipping local save");
    }

    rec.record(
        "POST new product (API)",
        api.create(&plan.remote_draft).await,
        |item| ("product created".to_string(), Payload::Item(item.clone())),
    )
    .await;

    rec.record(
        "GET product by id (API)",
        api.get_by_id(plan.lookup_id).await,
        |item| {
            (
                format!("product {} found", plan.lookup_id),
                Payload::Item(item.clone()),
            )
        },
    )
    .await;

    rec.record(
        "DELETE product (API)",
        api.delete(plan.delete_id).await,
        |item| {
            (
                format!("product {} deleted", plan.delete_id),
                Payload::Item(item.clone()),
            )
        },
    )
    .await;

    rec.record(
        "PUT update product (API)",
        api.update(plan.update_id, &plan.update_draft).await,
        |item| {
            (
                format!("product {} updated", plan.update_id),
                Payload::Item(item.clone()),
            )
        },
    )
    .await;

    rec.record(
        "Append product to local store",
        store.append(plan.local_draft.clone()).await,
        |item| ("product appended locally".to_string(), Payload::Item(item.clone())),
    )
    .await;

    rec.record("Local store stats", snapshot(store).await, stats_payload)
        .await;

    rec.record(
        "Prune local products by price",
        store.prune_above_price(plan.price_ceiling).await,
        |outcome| {
            (
                format!(
                    "removed {}, {} remaining",
                    outcome.removed, outcome.remaining
                ),
                Payload::Pruned {
                    threshold: plan.price_ceiling,
                    outcome: outcome.clone(),
                },
            )
        },
    )
    .await;

    rec.record("Local store stats", snapshot(store).await, stats_payload)
        .await;

    if let Some(all) = all.as_deref() {
        rec.record(
            "Filter products by category",
            Ok(query::by_category(all, &plan.category)),
            |found| matches_payload(found.clone(), format!("in category '{}'", plan.category)),
        )
        .await;
        rec.record(
            "Search products by title",
            Ok(query::by_title(all, &plan.title_query)),
            |found| matches_payload(found.clone(), format!("with '{}' in the title", plan.title_query)),
        )
        .await;
        rec.record(
            "Filter products by rating",
            Ok(query::min_rating(all, plan.min_rating)),
            |found| matches_payload(found.clone(), format!("rated {} or more", plan.min_rating)),
        )
        .await;
    }

    if let Some(path) = &plan.export_path {
        let exported = match store.load().await {
            Ok(items) => export::write_csv(&items, path),
            Err(err) => Err(err),
        };
        rec.record("Export local store to CSV", exported, |rows| {
            (
                format!("{rows} rows written"),
                Payload::Exported {
                    path: path.clone(),
                    rows: *rows,
                },
            )
        })
        .await;
    }

    let summary = RunSummary { steps: rec.steps };
    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "walkthrough finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::report::Outcome;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeApi {
        products: Vec<CatalogItem>,
        fail_limited: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new() -> Self {
            let products = serde_json::from_value(json!([
                {"id": 1, "title": "Slim Fit T-Shirt", "price": 22.3, "category": "men's clothing",
                 "rating": {"rate": 4.1, "count": 259}},
                {"id": 2, "title": "SanDisk SSD 1TB", "price": 109, "category": "electronics",
                 "rating": {"rate": 2.9, "count": 470}},
                {"id": 3, "title": "Cotton Shirt", "price": 7.95, "category": "men's clothing"},
                {"id": 4, "title": "Monitor 24", "price": "599", "category": "electronics",
                 "rating": {"rate": 4.4, "count": 250}}
            ]))
            .unwrap();
            Self {
                products,
                fail_limited: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn find(&self, id: i64, url: &str) -> Result<CatalogItem> {
            self.products
                .iter()
                .find(|p| p.id() == id)
                .cloned()
                .ok_or_else(|| CatalogError::Request {
                    url: url.to_string(),
                    status: Some(404),
                    message: "Not Found".into(),
                })
        }
    }

    #[async_trait]
    impl CatalogApi for FakeApi {
        async fn list_all(&self) -> Result<Vec<CatalogItem>> {
            self.log("list_all".into());
            Ok(self.products.clone())
        }

        async fn list_limited(&self, limit: u32) -> Result<Vec<CatalogItem>> {
            self.log(format!("list_limited({limit})"));
            if self.fail_limited {
                return Err(CatalogError::Request {
                    url: "fake://products".into(),
                    status: None,
                    message: "connection reset".into(),
                });
            }
            Ok(self.products.iter().take(limit as usize).cloned().collect())
        }

        async fn create(&self, draft: &ItemDraft) -> Result<CatalogItem> {
            self.log("create".into());
            Ok(draft.clone().into_item(self.products.len() as i64 + 1))
        }

        async fn get_by_id(&self, id: i64) -> Result<CatalogItem> {
            self.log(format!("get_by_id({id})"));
            self.find(id, "fake://products/id")
        }

        async fn update(&self, id: i64, changes: &ItemDraft) -> Result<CatalogItem> {
            self.log(format!("update({id})"));
            self.find(id, "fake://products/id")?;
            Ok(changes.clone().into_item(id))
        }

        async fn delete(&self, id: i64) -> Result<CatalogItem> {
            self.log(format!("delete({id})"));
            self.find(id, "fake://products/id")
        }
    }

    fn operations(summary: &RunSummary) -> Vec<&str> {
        summary.steps.iter().map(|s| s.operation.as_str()).collect()
    }

    #[tokio::test]
    async fn full_run_mirrors_then_prunes() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        let api = FakeApi::new();
        let plan = WalkthroughPlan {
            limit: 3,
            export_path: Some(dir.path().join("products.csv")),
            ..WalkthroughPlan::default()
        };
        let mut seen = 0;

        let summary = run_walkthrough(&api, &store, &plan, |_| seen += 1).await;

        assert_eq!(summary.failed(), 0, "{:#?}", summary.steps);
        assert_eq!(seen, summary.steps.len());
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["list_all", "list_limited(3)", "create", "get_by_id(1)", "delete(1)", "update(2)"]
        );

        // the local append lands after the three mirrored items
        let appended = summary
            .steps
            .iter()
            .find(|s| s.operation == "Append product to local store")
            .and_then(|s| s.payload())
            .unwrap();
        match appended {
            Payload::Item(item) => assert_eq!(item.id(), 4),
            other => panic!("unexpected payload {other:?}"),
        }

        // 22.3 and 7.95 survive the 30.0 ceiling; 109 and the local 45.0 do not
        let ids: Vec<i64> = store.load().await.unwrap().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![1, 3]);

        let csv = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);

        let ops = operations(&summary);
        assert!(ops.contains(&"Filter products by category"));
        assert_eq!(ops.last(), Some(&"Export local store to CSV"));
    }

    #[tokio::test]
    async fn queries_run_over_the_full_list() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        let api = FakeApi::new();

        let summary = run_walkthrough(&api, &store, &WalkthroughPlan::default(), |_| {}).await;

        let count_for = |op: &str| match summary
            .steps
            .iter()
            .find(|s| s.operation == op)
            .and_then(|s| s.payload())
        {
            Some(Payload::Items(items)) => items.len(),
            other => panic!("unexpected payload for {op}: {other:?}"),
        };
        assert_eq!(count_for("Filter products by category"), 2);
        assert_eq!(count_for("Search products by title"), 2);
        assert_eq!(count_for("Filter products by rating"), 2);
    }

    #[tokio::test]
    async fn failed_limited_list_skips_save_but_run_continues() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        let api = FakeApi {
            fail_limited: true,
            ..FakeApi::new()
        };
        let plan = WalkthroughPlan {
            price_ceiling: 50.0,
            ..WalkthroughPlan::default()
        };

        let summary = run_walkthrough(&api, &store, &plan, |_| {}).await;

        assert_eq!(summary.failed(), 1);
        let failed = summary.steps.iter().find(|s| !s.is_success()).unwrap();
        assert_eq!(failed.operation, "GET limited products (API)");
        assert!(matches!(failed.outcome, Outcome::Failure { kind: "request", .. }));
        assert!(!operations(&summary).contains(&"Save products to local JSON"));

        // store started empty, so the local item is id 1 and survives a 50.0 ceiling
        let items = store.load().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), 1);
        assert_eq!(items[0].title(), Some("Local product"));
    }

    #[tokio::test]
    async fn missing_remote_item_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("products.json"));
        let api = FakeApi::new();
        let plan = WalkthroughPlan {
            lookup_id: 42,
            ..WalkthroughPlan::default()
        };

        let summary = run_walkthrough(&api, &store, &plan, |_| {}).await;

        assert_eq!(summary.failed(), 1);
        let failed = summary.steps.iter().find(|s| !s.is_success()).unwrap();
        assert_eq!(failed.operation, "GET product by id (API)");
        assert!(operations(&summary).contains(&"Prune local products by price"));
    }

    #[test]
    fn plan_follows_config() {
        let cfg = CatalogConfig::from_lookup(|key| match key {
            "CATALOG_LIST_LIMIT" => Some("8".into()),
            "CATALOG_STEP_DELAY_MS" => Some("250".into()),
            _ => None,
        })
        .unwrap();
        let plan = WalkthroughPlan::from_config(&cfg);
        assert_eq!(plan.limit, 8);
        assert_eq!(plan.step_delay, Duration::from_millis(250));
        assert_eq!(plan.price_ceiling, 30.0);
    }
}
