//! Blobgate daemon
//!
//! Usage:
//!   blobgate [--addr 0.0.0.0:4000]
//!
//! Configuration comes from the environment: RPC_URL, INDEXER_RPC,
//! PRIVATE_KEY (required), PORT, STAGING_DIR, MAX_UPLOAD_MB, BLOCK_SIZE.

use anyhow::{Context, Result};
use clap::Parser;

use blobgate::{Config, GatewayServer};
use blobgate_client::{ClientConfig, StorageClient, DEFAULT_TIMEOUT};

#[derive(Parser)]
#[command(name = "blobgate")]
#[command(about = "Merkle-addressed file storage gateway", long_about = None)]
struct Cli {
    /// Listen address, overriding PORT
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blobgate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Missing credentials are fatal: serving without a signer is meaningless
    let config = Config::from_env().context("invalid configuration")?;

    let client = StorageClient::new(ClientConfig {
        rpc_url: config.rpc_url.clone(),
        indexer_url: config.indexer_url.clone(),
        signer_key: config.private_key.clone(),
        timeout: DEFAULT_TIMEOUT,
    })
    .context("failed to construct storage client")?;

    let mut server = GatewayServer::new(&config, client).await?;
    if let Some(addr) = cli.addr {
        server = server.with_addr(addr);
    }
    server.run().await
}
