//! CLI for uploading and downloading files

use clap::{Parser, Subcommand};
use shardfs::common::{file_id_of, format_bytes, parse_duration};
use shardfs::{Client, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shardfs")]
#[command(about = "shardfs distributed file store CLI")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = shardfs::common::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Coordinator gRPC address
    #[arg(long)]
    coordinator: Option<String>,

    /// Per-request deadline (e.g. "5s", "500ms")
    #[arg(long)]
    timeout: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Upload {
        /// File path
        path: PathBuf,

        /// File id (defaults to the file name without extension)
        #[arg(long)]
        file_id: Option<String>,

        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,
    },

    /// Download a file as output.<type>
    Download {
        /// File id
        file_id: String,

        /// Chunk size in bytes (must match the upload)
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show where each chunk of a file lives
    Locate {
        /// File id
        file_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::load_from(&cli.config)?.client;
    if let Some(coordinator) = cli.coordinator {
        config.coordinator = coordinator;
    }
    if let Some(timeout) = cli.timeout {
        let timeout = parse_duration(&timeout)?.as_millis() as u64;
        config.rpc_timeout_ms = timeout;
        config.http_timeout_ms = timeout;
    }

    match cli.command {
        Commands::Upload {
            path,
            file_id,
            chunk_size,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            let file_id = match file_id.or_else(|| file_id_of(&path)) {
                Some(id) => id,
                None => anyhow::bail!("cannot derive a file id from {}", path.display()),
            };

            let client = Client::connect(config).await?;
            let summary = client.upload(&path, &file_id).await?;
            println!("Uploaded {}:", summary.file_id);
            println!("  Size: {}", format_bytes(summary.bytes));
            println!("  Chunks: {}", summary.total_chunks);
            println!("  Replica writes: {}", summary.replica_writes);
        }

        Commands::Download {
            file_id,
            chunk_size,
            output_dir,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }

            let client = Client::connect(config).await?;
            let output = client.download(&file_id).await?;
            println!("Downloaded {} to {}", file_id, output.display());
        }

        Commands::Locate { file_id } => {
            let client = Client::connect(config).await?;
            let locations = client.locate(&file_id).await?;
            println!("File {}:", file_id);
            println!("  Type: {}", locations.file_type);
            if let Some(chunk_size) = locations.chunk_size {
                println!("  Chunk size: {}", chunk_size);
            }
            for chunk in &locations.chunks {
                println!("  Chunk {}: {}", chunk.chunk_id, chunk.replicas.join(", "));
            }
        }
    }

    Ok(())
}
