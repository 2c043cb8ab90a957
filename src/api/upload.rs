use std::sync::Arc;
use axum::extract::{Extension, Json, Multipart};
use serde::Serialize;
use tracing::instrument;

use crate::error::{ServerError, ServerResult};
use crate::State;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Acknowledgement sent once the upload is stored.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UploadResult {
    pub status: UploadStatus,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
}

/// Receives a file and overwrites the stored one with it.
#[instrument(skip_all)]
#[axum_macros::debug_handler]
pub async fn upload(
    Extension(state): Extension<Arc<State>>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResult>> {
    let data = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(ServerError::request_error)?
            .ok_or_else(|| ServerError::missing_field(FILE_FIELD))?;

        if field.name() != Some(FILE_FIELD) {
            tracing::debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        tracing::debug!("Receiving {:?}", field.file_name());
        break field.bytes().await.map_err(ServerError::request_error)?;
    };

    let stored = state.storage().store(data).await?;
    tracing::debug!("Stored {} bytes at {}", stored.size, stored.path.display());

    Ok(Json(UploadResult {
        status: UploadStatus::Success,
    }))
}
