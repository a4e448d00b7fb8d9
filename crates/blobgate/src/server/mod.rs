mod handlers;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use blobgate_client::StorageClient;

use crate::config::Config;
use crate::staging::StagingArea;

/// Shared request state. The client is read-only after construction and
/// safe for concurrent use; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub client: StorageClient,
    pub staging: Arc<StagingArea>,
    pub block_size: usize,
}

pub struct GatewayServer {
    state: AppState,
    addr: String,
    max_upload_bytes: usize,
}

impl GatewayServer {
    pub async fn new(config: &Config, client: StorageClient) -> Result<Self> {
        let staging = Arc::new(StagingArea::new(&config.staging_dir).await?);
        Ok(Self {
            state: AppState {
                client,
                staging,
                block_size: config.block_size,
            },
            addr: format!("0.0.0.0:{}", config.port),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Override the listen address
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/storage/upload", post(handlers::upload))
            .route("/storage/download/:root_hash", get(handlers::download))
            .route("/health", get(handlers::health))
            .layer(DefaultBodyLimit::max(self.max_upload_bytes))
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr()).await?;
        tracing::info!("storage gateway listening on http://{}", self.addr());
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
