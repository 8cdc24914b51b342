//! scout-resolve - resolve player names from the command line
//!
//! Thin shell over the scout-resolver library. Results go to stdout as JSON;
//! logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use scout_common::SystemClock;
use scout_resolver::roster::{enrich_roster, JsonFileDirectory};
use scout_resolver::{BatchOutcome, BatchResolver, EnrichmentOrchestrator, Query, ResolverConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for scout-resolve
#[derive(Parser, Debug)]
#[command(name = "scout-resolve")]
#[command(about = "Resolve player names to rated profiles")]
#[command(version)]
struct Args {
    /// Config file (overrides SCOUT_CONFIG and the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Permit live enrichment through the fetch chain
    #[arg(long)]
    live: bool,

    /// Known stable identifier (single name only)
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// Enrich every player in a JSON roster file instead of NAME arguments
    #[arg(long, value_name = "FILE", conflicts_with_all = ["names", "id"])]
    roster: Option<PathBuf>,

    /// Player names to resolve
    #[arg(value_name = "NAME", required_unless_present = "roster")]
    names: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ResolverConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins; the config file supplies the fallback level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting scout-resolve v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = Arc::new(
        EnrichmentOrchestrator::new(&config, Arc::new(SystemClock))
            .context("Failed to initialize resolver")?,
    );
    let batch = BatchResolver::new(orchestrator, config.batch.clone());

    if let Some(path) = args.roster {
        let directory = JsonFileDirectory::new(path);
        let report = enrich_roster(&directory, &batch, args.live)
            .await
            .context("Roster enrichment failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.id.is_some() && args.names.len() > 1 {
        bail!("--id applies to a single NAME, got {}", args.names.len());
    }

    let queries: Vec<Query> = args
        .names
        .iter()
        .map(|name| {
            let mut query = Query::new(name.clone());
            if args.live {
                query = query.with_network();
            }
            if let Some(id) = &args.id {
                query = query.with_stable_id(id.clone());
            }
            query
        })
        .collect();

    for outcome in batch.resolve_all(queries).await {
        let json = match &outcome {
            BatchOutcome::Resolved { resolution } => serde_json::to_string_pretty(resolution)?,
            BatchOutcome::Failed { .. } => serde_json::to_string_pretty(&outcome)?,
        };
        println!("{}", json);
    }

    Ok(())
}
