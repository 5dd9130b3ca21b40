use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beq_bridge::config::{BridgeConfig, FileConfig};
use beq_bridge::{
    HttpCatalogFetcher, HttpProfileLoader, InMemoryStateStore, NoOpProfileLoader, ProfileBridge,
    ProfileLoader, SearchOutcome, StateStore,
};

/// One-shot candidate search against the live BEQ catalogue.
#[derive(Parser, Debug)]
struct CliArgs {
    /// TMDB ids to match, comma separated.
    #[clap(long)]
    pub ids: Option<String>,

    /// Title prefixes to match, comma separated.
    #[clap(long)]
    pub titles: Option<String>,

    /// Maximum number of candidates to list.
    #[clap(long)]
    pub limit: Option<usize>,

    /// Path to a TOML config file.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = BridgeConfig::resolve(file_config);
    info!("Using catalogue at {}", config.catalog_url);

    let store = Arc::new(InMemoryStateStore::new());
    if let Some(ids) = &cli_args.ids {
        store.set(&config.id_source_key, ids.clone());
    }
    if let Some(titles) = &cli_args.titles {
        store.set(&config.title_source_key, titles.clone());
    }

    let fetcher = Arc::new(HttpCatalogFetcher::new(
        config.catalog_url.clone(),
        config.catalog_timeout_sec,
    )?);
    let loader: Arc<dyn ProfileLoader> = match &config.loader_url {
        Some(url) => Arc::new(HttpProfileLoader::new(
            url.clone(),
            config.loader_timeout_sec,
            store.clone(),
        )?),
        None => Arc::new(NoOpProfileLoader),
    };

    let bridge = ProfileBridge::new(config, store, loader, fetcher);

    let outcome = bridge.search("cli", cli_args.limit).await?;
    let snapshot = bridge.snapshot("cli");

    match outcome {
        SearchOutcome::Ready { candidates } => {
            println!("{} candidate(s):", candidates);
            for (i, label) in snapshot.candidates.iter().enumerate() {
                let marker = if *label == snapshot.selected { "*" } else { " " };
                println!(" {} {}. {}", marker, i + 1, label);
            }
        }
        SearchOutcome::NoCandidates => println!("No candidates matched."),
        SearchOutcome::WaitingForInput => println!("Provide --ids and/or --titles to search."),
        SearchOutcome::Disabled => println!("Search is disabled."),
    }
    println!(
        "Status: {} ({})",
        snapshot.status.stage.name(),
        snapshot.status.reason
    );

    Ok(())
}
