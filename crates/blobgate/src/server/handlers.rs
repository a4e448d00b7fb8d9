use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, Response, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use blobgate_core::AddressingError;

use super::AppState;
use crate::download::{self, DownloadError};
use crate::staging::StagedFile;
use crate::upload::{self, UploadError};

type HttpResponse = Response<Body>;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// POST /storage/upload
///
/// Stages the multipart `file` field on disk, addresses it, submits it to
/// the network, and returns the receipt. The staged file is deleted after
/// the attempt on every path.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> HttpResponse {
    let mut staged: Option<(StagedFile, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("malformed multipart body: {e}"),
                )
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let guard = state.staging.stage();
        if let Err(e) = write_field_to_disk(field, &guard).await {
            warn!("failed to stage upload: {e}");
            guard.remove().await;
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to stage upload",
            );
        }

        staged = Some((guard, original_name));
        break;
    }

    let Some((staged, original_name)) = staged else {
        return error_response(
            StatusCode::BAD_REQUEST,
            r#"file is required (multipart field name "file")"#,
        );
    };

    // Detached from the request: hyper drops this handler's future when the
    // caller disconnects, but a dispatched submission must still complete.
    // Only the response write is lost; the staged file is deleted inside the
    // task after the attempt regardless of outcome.
    let name = original_name.clone();
    let client = state.client.clone();
    let block_size = state.block_size;
    let task = tokio::spawn(async move {
        let result =
            upload::submit_staged(&client, staged.path(), &original_name, block_size).await;
        staged.remove().await;
        result
    });

    match task.await {
        Ok(Ok(receipt)) => Json(receipt).into_response(),
        Ok(Err(UploadError::Addressing(AddressingError::EmptyInput))) => {
            error_response(StatusCode::BAD_REQUEST, "cannot upload an empty file")
        }
        Ok(Err(e)) => {
            error!("upload of {:?} failed: {e}", name);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!("upload task for {:?} panicked: {e}", name);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "upload failed")
        }
    }
}

async fn write_field_to_disk(mut field: Field<'_>, staged: &StagedFile) -> anyhow::Result<()> {
    let mut file = tokio::fs::File::create(staged.path()).await?;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// GET /storage/download/:root_hash
///
/// Relays the network stream to the caller incrementally. Backpressure and
/// disconnect handling come from the body stream: axum stops polling when
/// the caller stalls and drops the stream when it goes away, which releases
/// the network connection.
pub async fn download(
    State(state): State<AppState>,
    Path(root_hash): Path<String>,
) -> HttpResponse {
    match download::open(&state.client, &root_hash).await {
        Ok(stream) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={root_hash}"),
            )
            .body(Body::from_stream(stream))
            .unwrap(),
        Err(DownloadError::InvalidHash(hash)) => {
            error_response(StatusCode::BAD_REQUEST, &format!("invalid root hash: {hash}"))
        }
        Err(DownloadError::NotFound(hash)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Not found",
                "details": format!("no blob for root hash {hash}"),
            })),
        )
            .into_response(),
        Err(DownloadError::Network(details)) => {
            error!("download of {root_hash} failed: {details}");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Not found", "details": details })),
            )
                .into_response()
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    (status, Json(json!({ "error": message }))).into_response()
}
