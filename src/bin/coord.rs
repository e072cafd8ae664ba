//! Coordinator binary

use clap::{Parser, Subcommand};
use shardfs::{Config, Coordinator};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shardfs-coord")]
#[command(about = "shardfs coordinator: node registry and chunk placement")]
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
    /// Start coordinator server
    Serve {
        /// Bind address for gRPC
        #[arg(long)]
        grpc: Option<String>,

        /// Bind address for HTTP
        #[arg(long)]
        http: Option<String>,

        /// Replicas per chunk
        #[arg(long)]
        replicas: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            grpc,
            http,
            replicas,
        } => {
            // CLI has priority over the config file
            let mut coord_config = config.coordinator;
            if let Some(grpc) = grpc {
                coord_config.grpc_addr = grpc.parse()?;
            }
            if let Some(http) = http {
                coord_config.http_addr = http.parse()?;
            }
            if let Some(replicas) = replicas {
                anyhow::ensure!(replicas > 0, "--replicas must be at least 1");
                coord_config.replicas = replicas;
            }

            Coordinator::new(coord_config).serve().await?;
        }
    }

    Ok(())
}
