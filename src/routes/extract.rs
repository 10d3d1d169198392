use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{services::extract_service::ExtractError, AppState};

const URL_REQUIRED: &str = "URL del PDF requerida.";
const EXTRACTION_FAILED: &str = "No se pudo extraer el texto del PDF.";

#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    pub url: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[utoipa::path(
    get,
    path = "/api/extract-pdf-text",
    params(("url" = String, Query, description = "http(s) URL of the PDF")),
    responses(
        (status = 200, description = "Plain text of the PDF"),
        (status = 400, description = "URL missing or invalid"),
        (status = 500, description = "Download or parsing failed")
    )
)]
#[axum::debug_handler]
pub async fn extract_pdf_text(
    State(state): State<AppState>,
    Query(query): Query<ExtractQuery>,
) -> Response {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, URL_REQUIRED);
    };

    match state.extractor.extract_text(&url).await {
        Ok(text) => (StatusCode::OK, Json(json!({ "text": text }))).into_response(),
        Err(ExtractError::InvalidUrl) => error_response(StatusCode::BAD_REQUEST, URL_REQUIRED),
        Err(e) => {
            tracing::error!(url = %url, error = %e, "PDF text extraction failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, EXTRACTION_FAILED)
        }
    }
}
