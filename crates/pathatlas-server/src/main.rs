//! pathatlas-server: serve schema queries over a knowledgebase snapshot.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pathatlas_graphdb::synthetic::synthetic_snapshot;
use pathatlas_graphdb::GraphSnapshot;
use pathatlas_schema::{SchemaQueryService, SchemaRegistry, SpeciesCatalog};
use pathatlas_server::{serve, ServerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "pathatlas-server",
    about = "Read-only schema query façade over a pathway knowledgebase snapshot"
)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8701")]
    listen: SocketAddr,

    /// Snapshot to serve: a JSON array of records.
    #[arg(long, value_name = "FILE", conflicts_with = "synthetic")]
    snapshot: Option<PathBuf>,

    /// Serve the built-in deterministic demo snapshot instead of a file.
    #[arg(long)]
    synthetic: bool,

    /// Per-request engine timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let snapshot: GraphSnapshot = if let Some(path) = &args.snapshot {
        GraphSnapshot::from_json_file(path)?
    } else if args.synthetic {
        synthetic_snapshot()
    } else {
        bail!("provide --snapshot <FILE> or --synthetic");
    };
    tracing::info!(
        records = snapshot.len(),
        classes = snapshot.class_count(),
        species = snapshot.species_count(),
        "snapshot loaded"
    );

    let service = Arc::new(SchemaQueryService::new(
        Arc::new(SchemaRegistry::pathway_domain()),
        Arc::new(SpeciesCatalog::curated()),
        snapshot,
    ));

    let config = ServerConfig {
        listen: args.listen,
        request_timeout: Duration::from_secs(args.request_timeout_secs),
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to initialize tokio runtime: {e}"))?;

    rt.block_on(serve(config, service))
}
