use anyhow::{Context, Result};
use tracing::info;

use crate::orchestrator::{run_walkthrough, RunSummary, WalkthroughPlan};
use crate::remote::StoreApiProvider;
use crate::report;
use crate::store::CatalogStore;
use crate::util::env::CatalogConfig;

const WIDTH: usize = 60;

/// Run the full walkthrough against the configured API and store, printing
/// each step as it lands.
pub async fn run(cfg: &CatalogConfig) -> Result<RunSummary> {
    let api = StoreApiProvider::new(Some(cfg.api_base_str()), Some(cfg.timeout_secs))
        .context("failed to build catalog API client")?;
    let store = CatalogStore::new(cfg.store_path.clone());
    let plan = WalkthroughPlan::from_config(cfg);
    info!(limit = plan.limit, price_ceiling = plan.price_ceiling, "starting walkthrough");

    println!("{}", report::separator("CATALOG MIRROR WALKTHROUGH", '=', WIDTH));
    println!("API:   {}", api.base_url());
    println!("Store: {}", store.path().display());

    let summary = run_walkthrough(&api, &store, &plan, |step| {
        print!("{}", report::render_step(step));
    })
    .await;

    println!("{}", report::separator("SUMMARY", '=', WIDTH));
    println!(
        "{} steps: {} succeeded, {} failed",
        summary.steps.len(),
        summary.succeeded(),
        summary.failed()
    );
    Ok(summary)
}
