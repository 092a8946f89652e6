//! Query server for mining district and claim lookups.
//!
//! Loads the three collections once at startup, indexes them in memory and
//! serves point lookups and proximity searches over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use aurum::config::{Config, DatasetsConfig};
use aurum::loader::{self, LoadedDataset};
use aurum::models::DatasetKind;
use aurum::pip::{FeatureIndex, QueryEngine};
use aurum::Projector;

mod routes;
use routes::{router, AppState};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Mining district and claim lookup server")]
struct Args {
    /// TOML config file
    #[arg(short, long, default_value = "aurum.toml")]
    config: PathBuf,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Aurum Query Server");

    let config = if args.config.exists() {
        info!("Loading config from {}", args.config.display());
        Config::load_from_file(&args.config)?
    } else {
        warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
        Config::default()
    };

    // Loading and indexing are CPU bound
    let datasets = config.datasets.clone();
    let engine = tokio::task::spawn_blocking(move || -> Result<QueryEngine> {
        let projector = Projector::utm_13n().context("Failed to build query projection")?;
        let districts = build_index(&datasets, DatasetKind::Districts, loader::load_districts)?;
        let active_claims =
            build_index(&datasets, DatasetKind::ActiveClaims, loader::load_claims)?;
        let inactive_claims =
            build_index(&datasets, DatasetKind::InactiveClaims, loader::load_claims)?;
        Ok(QueryEngine::new(
            projector,
            districts,
            active_claims,
            inactive_claims,
        ))
    })
    .await??;

    let state = Arc::new(AppState { engine });
    let app = router(state);

    let listen = args.listen.unwrap_or(config.server.listen);
    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load one collection; a collection without a config entry is served empty.
fn build_index<A>(
    datasets: &DatasetsConfig,
    kind: DatasetKind,
    load: fn(&std::path::Path, Option<u32>) -> aurum::error::Result<LoadedDataset<A>>,
) -> Result<FeatureIndex<A>> {
    let Some(dataset) = datasets.get(kind) else {
        warn!("No dataset configured for {}, serving an empty collection", kind);
        return Ok(FeatureIndex::default());
    };

    info!("Loading {} from {}", kind, dataset.path.display());
    let loaded = load(&dataset.path, dataset.source_epsg)
        .with_context(|| format!("Failed to load {} dataset", kind))?;

    if loaded.skipped > 0 {
        warn!(
            "{}: skipped {} features without usable geometry",
            kind, loaded.skipped
        );
    }

    Ok(FeatureIndex::build(kind.field_name(), loaded.features))
}
