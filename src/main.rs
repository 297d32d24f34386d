use anyhow::Result;
use catalog_mirror::cli::walkthrough;
use catalog_mirror::tracing::init_tracing;
use catalog_mirror::util::env::{self, CatalogConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // --- logging -------------------------------------------------------------
    env::init_env();
    init_tracing("catalog_mirror=info")?;

    let cfg = CatalogConfig::from_env()?;
    let summary = walkthrough::run(&cfg).await?;
    if summary.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
