//! TokenGate runner entry point.
//!
//! Deploys a permissioned token with its identity registries, seeds it from
//! a TOML file or defaults, runs the configured scenario and snapshots the
//! resulting state to RocksDB.

// Snapshot read-back APIs are used by tests.
#![allow(dead_code)]

mod config;
mod deployment;
mod snapshot;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::TokenGateConfig;
use deployment::Deployment;
use snapshot::Snapshot;
use storage::Storage;

/// TokenGate runner
#[derive(Parser, Debug)]
#[command(name = "tokengate-node", version, about = "TokenGate deployment runner")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "tokengate.toml")]
    config: PathBuf,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Skip writing the snapshot.
    #[arg(long)]
    no_persist: bool,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        init_tracing(args.log_level.as_deref().unwrap_or("info"), "text");
        let config = TokenGateConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = TokenGateConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.no_persist {
        config.storage.persist = false;
    }

    init_tracing(&config.logging.level, &config.logging.format);
    tracing::info!("TokenGate runner v{}", env!("CARGO_PKG_VERSION"));

    let deployment = Deployment::bootstrap(&config)?;
    deployment.run_scenario(&config.scenario)?;

    if config.storage.persist {
        let storage = Storage::open(&config.storage.data_dir)?;
        storage.write_snapshot(&Snapshot::capture(&deployment))?;
        tracing::info!(path = %config.storage.data_dir.display(), "state persisted");
    }

    tracing::info!("TokenGate runner finished");
    Ok(())
}
