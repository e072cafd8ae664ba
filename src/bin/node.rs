//! Storage node binary

use anyhow::Result;
use clap::{Parser, Subcommand};
use shardfs::{Config, StorageServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shardfs-node")]
#[command(about = "shardfs storage node: stores and serves chunk bytes")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = shardfs::common::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start storage node
    Serve {
        /// Address to listen on (port 0 picks a free port)
        #[arg(long)]
        bind: Option<String>,

        /// Address to register with the coordinator
        #[arg(long)]
        advertise: Option<String>,

        /// Coordinator gRPC address
        #[arg(long)]
        coordinator: Option<String>,

        /// Chunk directory (in-memory when omitted)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;

    let Commands::Serve {
        bind,
        advertise,
        coordinator,
        data,
        log_level,
    } = cli.command;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.unwrap_or(config.log_level.clone()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut node_config = config.node;
    if let Some(bind) = bind {
        node_config.bind_addr = bind.parse()?;
    }
    if advertise.is_some() {
        node_config.advertise_addr = advertise;
    }
    if let Some(coordinator) = coordinator {
        node_config.coordinator = coordinator;
    }
    if data.is_some() {
        node_config.data_dir = data;
    }

    StorageServer::new(node_config).serve().await?;

    Ok(())
}
