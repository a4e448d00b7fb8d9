//! Download orchestrator: resolve a root hash to the network byte stream.

use blobgate_client::{ByteStream, ClientError, StorageClient};
use blobgate_core::from_hex;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid root hash: {0}")]
    InvalidHash(String),
    #[error("root hash {0} not found")]
    NotFound(String),
    #[error("network download failed: {0}")]
    Network(String),
}

/// Open a download stream for a root hash.
///
/// The caller relays the stream to its sink incrementally; dropping the
/// stream (natural end of data or caller disconnect) releases the network
/// connection exactly once.
pub async fn open(client: &StorageClient, root_hash: &str) -> Result<ByteStream, DownloadError> {
    // A root hash is 32 bytes of hex, nothing else
    if from_hex(root_hash).is_err() {
        return Err(DownloadError::InvalidHash(root_hash.to_string()));
    }

    match client.open_download(&root_hash.to_lowercase()).await {
        Ok(stream) => Ok(stream),
        Err(ClientError::NotFound(hash)) => Err(DownloadError::NotFound(hash)),
        Err(e) => Err(DownloadError::Network(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_client::{ClientConfig, DEFAULT_TIMEOUT};

    fn unreachable_client() -> StorageClient {
        StorageClient::new(ClientConfig {
            rpc_url: "http://127.0.0.1:9".to_string(),
            indexer_url: "http://127.0.0.1:9".to_string(),
            signer_key: "11".repeat(32),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_malformed_hashes() {
        let client = unreachable_client();

        for bad in ["", "abc", &"zz".repeat(32), &"ab".repeat(33)] {
            let err = match open(&client, bad).await {
                Err(e) => e,
                Ok(_) => panic!("expected error for {bad:?}"),
            };
            assert!(matches!(err, DownloadError::InvalidHash(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_unreachable_network_is_network_error() {
        let client = unreachable_client();
        let err = match open(&client, &"ab".repeat(32)).await {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, DownloadError::Network(_)));
    }
}
