use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    services::storage_service::BlobStore,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub token: Option<String>,
}

fn content_type_for(path: &str) -> &'static str {
    if path.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Serves a stored blob to holders of a signed download URL.
#[axum::debug_handler]
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<FileQuery>,
) -> Result<impl IntoResponse> {
    let path = path.trim_start_matches('/');
    let token = query.token.unwrap_or_default();
    if !state.blobs.verify_token(path, &token) {
        tracing::warn!(path, "rejected file download with invalid token");
        return Err(Error::Forbidden("Invalid or missing download token".into()));
    }

    let data = state.blobs.get(path).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(path))], data))
}
