//! Upload orchestrator: address the staged file, then submit it.

use std::path::Path;

use tracing::{debug, info};

use blobgate_client::{ClientError, StorageClient};
use blobgate_core::{address_blob, to_hex, AddressingError, UploadReceipt};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("addressing failed: {0}")]
    Addressing(#[from] AddressingError),
    #[error("staging file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("network submit failed: {0}")]
    Submit(#[from] ClientError),
}

/// Address the staged file and submit it to the storage network.
///
/// Addressing completes (or fails) strictly before the submission starts;
/// no network call is made on an addressing failure. Exactly one submission
/// attempt is made, and once dispatched it must run to completion: the
/// handler drives this future on a detached task so an uploader disconnect
/// loses only the response write, never the submission.
///
/// Deleting the staged file is the caller's job (the staging guard runs
/// after the attempt regardless of outcome).
pub async fn submit_staged(
    client: &StorageClient,
    staged: &Path,
    original_name: &str,
    block_size: usize,
) -> Result<UploadReceipt, UploadError> {
    let source = tokio::fs::File::open(staged).await?;
    let blob = address_blob(source, block_size).await?;
    let root_hex = to_hex(&blob.root);
    debug!(
        "addressed {:?} as {} ({} blocks, {} bytes)",
        original_name, root_hex, blob.blocks, blob.size
    );

    let tx = client.submit(staged, &blob.root, blob.size).await?;
    info!("submitted {:?} as {} (tx {})", original_name, root_hex, tx);

    Ok(UploadReceipt {
        root_hash: root_hex,
        tx_hash: tx.0,
        original_name: original_name.to_string(),
        size: blob.size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_client::{ClientConfig, DEFAULT_TIMEOUT};
    use tempfile::TempDir;

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
    async fn test_empty_file_fails_before_any_network_call() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty");
        tokio::fs::write(&path, b"").await.unwrap();

        // The client points at a closed port; an EmptyInput error (not an
        // Http error) proves addressing failed first and nothing was sent.
        let err = submit_staged(&unreachable_client(), &path, "empty", 1024)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::Addressing(AddressingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_missing_staged_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = submit_staged(
            &unreachable_client(),
            &tmp.path().join("nope"),
            "nope",
            1024,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }

    #[tokio::test]
    async fn test_submit_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data");
        tokio::fs::write(&path, b"some bytes").await.unwrap();

        let err = submit_staged(&unreachable_client(), &path, "data", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Submit(_)));
    }
}
