use std::path::PathBuf;

use anyhow::Result;
use catalog_mirror::cli::local::{self, LocalCommand, LocalConfig};
use catalog_mirror::cli::remote::{self, RemoteCommand, RemoteConfig, SearchFilters};
use catalog_mirror::cli::{walkthrough, ItemFields};
use catalog_mirror::tracing::init_tracing;
use catalog_mirror::util::env::{self, parse_api_base, CatalogConfig};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Product catalog admin CLI")]
struct Cli {
    /// Local store file (overrides CATALOG_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Products API base URL (overrides CATALOG_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Print every remote product
    List,
    /// Print the first N remote products
    Limited { n: u32 },
    /// Print one remote product
    Get { id: i64 },
    /// Create a remote product
    Create {
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Update a remote product
    Update {
        id: i64,
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Delete a remote product
    Delete { id: i64 },
    /// Fetch remote products and overwrite the local store
    Mirror {
        /// Only the first N products (all when omitted)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Append a product to the local store with the next free id
    Append {
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Drop local products priced above the threshold
    Prune { threshold: f64 },
    /// Summarize the local store
    Stats {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the local store to CSV
    Export {
        /// Target file (defaults to CATALOG_EXPORT_PATH, then a timestamped name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Filter the remote product list
    Search {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        min_rating: Option<f64>,
    },
    /// Run the full remote + local walkthrough
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    env::init_env();
    init_tracing("catalog_mirror=info")?;

    let cli = Cli::parse();
    let mut cfg = CatalogConfig::from_env()?;
    if let Some(raw) = cli.api_base.as_deref() {
        cfg.api_base = parse_api_base(raw)?;
    }
    if let Some(store) = cli.store {
        cfg.store_path = store;
    }
    debug!(?cfg, "effective configuration");

    let remote_cfg = RemoteConfig {
        api_base: Some(cfg.api_base_str().to_string()),
        timeout_secs: Some(cfg.timeout_secs),
    };
    let local_cfg = LocalConfig {
        store_path: cfg.store_path.clone(),
    };

    let remote_cmd = match cli.command {
        Commands::List => RemoteCommand::List,
        Commands::Limited { n } => RemoteCommand::Limited(n),
        Commands::Get { id } => RemoteCommand::Get(id),
        Commands::Create { fields } => RemoteCommand::Create(fields.into_draft()),
        Commands::Update { id, fields } => RemoteCommand::Update(id, fields.into_draft()),
        Commands::Delete { id } => RemoteCommand::Delete(id),
        Commands::Search {
            category,
            title,
            min_rating,
        } => RemoteCommand::Search(SearchFilters {
            category,
            title,
            min_rating,
        }),
        Commands::Mirror { limit } => {
            return run_local(&remote_cfg, local_cfg, LocalCommand::Mirror { limit }).await;
        }
        Commands::Append { fields } => {
            return run_local(&remote_cfg, local_cfg, LocalCommand::Append(fields.into_draft()))
                .await;
        }
        Commands::Prune { threshold } => {
            return run_local(&remote_cfg, local_cfg, LocalCommand::Prune(threshold)).await;
        }
        Commands::Stats { json } => {
            return run_local(&remote_cfg, local_cfg, LocalCommand::Stats { json }).await;
        }
        Commands::Export { out } => {
            let out = out.or_else(|| cfg.export_path.clone());
            return run_local(&remote_cfg, local_cfg, LocalCommand::Export { out }).await;
        }
        Commands::Run => {
            let summary = walkthrough::run(&cfg).await?;
            if summary.failed() > 0 {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    remote::run(remote_cfg, remote_cmd).await
}

async fn run_local(remote_cfg: &RemoteConfig, cfg: LocalConfig, cmd: LocalCommand) -> Result<()> {
    let api = remote_cfg.provider()?;
    local::run(&api, cfg, cmd).await
}
