//! ipamd introspection endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!   operator / scraper
//!          │ HTTP/1.1
//!          ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//!   │ net listener │──▶│ request log  │──▶│ route table  │──▶│ snapshot provider│
//!   │ (restarts    │   │ (every req)  │   │ (exact match)│   │ (shared cells,   │
//!   │  w/ backoff) │   └──────────────┘   └──────┬───────┘   │  environment)    │
//!   └──────────────┘                             │           └──────────────────┘
//!                                                ▼
//!                                         /metrics (Prometheus)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;

use ipamd_introspect::config::{self, IntrospectConfig};
use ipamd_introspect::http::{IntrospectionServer, RouteTable};
use ipamd_introspect::lifecycle::{signals, Shutdown};
use ipamd_introspect::observability::{logging, metrics};
use ipamd_introspect::snapshot::{
    EniConfigs, EniInventory, EnvSettings, PodInventory, Providers, SharedSnapshot,
};

#[derive(Parser)]
#[command(name = "ipamd-introspect")]
#[command(about = "Read-only introspection endpoint for the address manager", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: IntrospectConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };

    logging::init(&config.observability);
    tracing::info!("ipamd-introspect v{} starting", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        tracing::info!("Introspection disabled by configuration");
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.server.bind_address,
        max_connections = config.server.max_connections,
        read_timeout_secs = config.server.read_timeout_secs,
        write_timeout_secs = config.server.write_timeout_secs,
        "Configuration loaded"
    );

    let metrics_handle = metrics::install_recorder()?;

    // Empty until the embedding address manager publishes into them.
    let enis: SharedSnapshot<EniInventory> = SharedSnapshot::default();
    let pods: SharedSnapshot<PodInventory> = SharedSnapshot::default();
    let eni_configs: SharedSnapshot<EniConfigs> = SharedSnapshot::default();

    let providers = Providers {
        enis: Arc::new(enis),
        pods: Arc::new(pods),
        networkutils_env: Arc::new(EnvSettings::networkutils()),
        ipamd_env: Arc::new(EnvSettings::ipamd()),
        eni_configs: Arc::new(eni_configs),
    };

    let server = IntrospectionServer::new(&config, RouteTable::standard(providers), metrics_handle)?;

    let shutdown = Shutdown::new();
    let server_task = server.spawn(shutdown.subscribe());

    signals::wait_for_signal().await?;
    shutdown.trigger();
    server_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
