//! Storage network client for blobgate
//!
//! Thin HTTP client over the remote storage network's indexer: submit a
//! staged blob under its Merkle root (the network anchors it on chain and
//! returns a transaction reference), or resolve a root hash back to a byte
//! stream. The network's replication and consensus are opaque to this
//! crate.
//!
//! One client is constructed at process start and shared by every request;
//! it is read-only after construction and `Clone` is cheap (the underlying
//! `reqwest::Client` is reference counted).

use std::fmt;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::debug;

use blobgate_core::{to_hex, Hash};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("signer key must be 32 bytes of hex")]
    InvalidSignerKey,

    #[error("staged file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("submit rejected: {0}")]
    SubmitRejected(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("root hash not found: {0}")]
    NotFound(String),
}

/// Transaction reference returned by the network when a blob is anchored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRef(pub String);

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental blob download: bytes arrive in network order, one chunk at a
/// time. Dropping the stream releases the underlying connection.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Chain signer credentials. The raw secret never leaves the process; only
/// the derived account identifier is sent with submissions.
#[derive(Clone)]
pub struct SignerKey {
    secret: [u8; 32],
}

impl SignerKey {
    /// Parse a 64-hex-char secret, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, ClientError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| ClientError::InvalidSignerKey)?;
        if bytes.len() != 32 {
            return Err(ClientError::InvalidSignerKey);
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&bytes);
        Ok(Self { secret })
    }

    /// Account identifier derived from the secret, sent in place of the raw
    /// key. The network maps it to the funded signer.
    pub fn account_id(&self) -> String {
        let digest: [u8; 32] = Sha256::digest(self.secret).into();
        format!("0x{}", &hex::encode(digest)[..40])
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret
        f.debug_struct("SignerKey")
            .field("account_id", &self.account_id())
            .finish()
    }
}

/// Client configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Chain RPC endpoint the network anchors against
    pub rpc_url: String,
    /// Indexer endpoint handling blob submission and retrieval
    pub indexer_url: String,
    /// Hex-encoded signer secret
    pub signer_key: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Storage network client
#[derive(Debug, Clone)]
pub struct StorageClient {
    rpc_url: String,
    indexer_url: String,
    signer: SignerKey,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

impl StorageClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let signer = SignerKey::from_hex(&config.signer_key)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            rpc_url: config.rpc_url,
            indexer_url: config.indexer_url.trim_end_matches('/').to_string(),
            signer,
            http,
        })
    }

    pub fn indexer_url(&self) -> &str {
        &self.indexer_url
    }

    /// Submit a staged blob under its Merkle root.
    ///
    /// The file is streamed to the indexer, not buffered. Exactly one
    /// attempt is made; the caller decides what a failure means. On success
    /// the network has anchored the content and returns the transaction
    /// reference.
    pub async fn submit(
        &self,
        file: &Path,
        root: &Hash,
        size: u64,
    ) -> Result<TxRef, ClientError> {
        let root_hex = to_hex(root);
        let url = format!("{}/v1/upload", self.indexer_url);

        let source = tokio::fs::File::open(file).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(source));

        let resp = self
            .http
            .post(&url)
            .header("X-Storage-Root", &root_hex)
            .header("X-Chain-Rpc", &self.rpc_url)
            .header("X-Signer-Address", self.signer.account_id())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::SubmitRejected(format!("{status}: {text}")));
        }

        let parsed: SubmitResponse = resp.json().await?;
        debug!(
            "submitted {} ({} bytes), tx {}",
            &root_hex[..12],
            size,
            parsed.tx_hash
        );
        Ok(TxRef(parsed.tx_hash))
    }

    /// Resolve a root hash to an incremental byte stream.
    ///
    /// An unknown hash maps to [`ClientError::NotFound`]; any other non-2xx
    /// status to [`ClientError::DownloadFailed`].
    pub async fn open_download(&self, root_hex: &str) -> Result<ByteStream, ClientError> {
        let url = format!("{}/v1/download/{}", self.indexer_url, root_hex);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(root_hex.to_string()));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::DownloadFailed(format!("{status}: {text}")));
        }

        debug!("downloading {}", &root_hex[..12.min(root_hex.len())]);
        Ok(resp.bytes_stream().boxed())
    }
}
