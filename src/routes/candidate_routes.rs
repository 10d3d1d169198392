use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::candidate_dto::{
        CandidateResponse, CreateCandidateForm, CvSummaryQuery, CvSummaryResponse,
        UpdateCandidatePayload,
    },
    error::{Error, Result},
    services::candidate_service::CvUpload,
    AppState,
};

/// Reads the `cv` file field and any text fields of the upload form.
async fn read_candidate_form(
    mut multipart: Multipart,
) -> Result<(CreateCandidateForm, Option<CvUpload>)> {
    let mut form = CreateCandidateForm::default();
    let mut cv = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv" => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                cv = Some(CvUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "nombre" => form.first_name = field.text().await?.trim().to_string(),
            "apellido" => form.last_name = field.text().await?.trim().to_string(),
            "correo" => form.email = field.text().await?.trim().to_string(),
            "telefono" => form.phone = field.text().await?.trim().to_string(),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok((form, cv))
}

fn require_cv(cv: Option<CvUpload>) -> Result<CvUpload> {
    cv.ok_or_else(|| Error::BadRequest("El archivo del CV es obligatorio.".into()))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/candidates",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    request_body(content = String, content_type = "multipart/form-data", description = "nombre, apellido, correo, telefono and the cv PDF"),
    responses(
        (status = 201, description = "Candidate created", body = CandidateResponse),
        (status = 400, description = "Missing field or CV is not a PDF"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Path(vacancy_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (form, cv) = read_candidate_form(multipart).await?;
    let cv = require_cv(cv)?;
    let candidate = state
        .candidate_service
        .create(vacancy_id, form, cv)
        .await?;
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(candidate))))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}/candidates",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    responses(
        (status = 200, description = "Candidates of the vacancy", body = [CandidateResponse]),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(vacancy_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list(vacancy_id).await?;
    let items: Vec<CandidateResponse> = candidates.into_iter().map(Into::into).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}/candidates/{candidate_id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate", body = CandidateResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get(vacancy_id, candidate_id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    patch,
    path = "/api/vacancies/{id}/candidates/{candidate_id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = UpdateCandidatePayload,
    responses(
        (status = 200, description = "Candidate updated", body = CandidateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCandidatePayload>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .update(vacancy_id, candidate_id, payload)
        .await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    put,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/cv",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "The replacement cv PDF"),
    responses(
        (status = 200, description = "CV replaced, cached summary cleared", body = CandidateResponse),
        (status = 400, description = "CV missing or not a PDF"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn replace_candidate_cv(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (_, cv) = read_candidate_form(multipart).await?;
    let cv = require_cv(cv)?;
    let candidate = state
        .candidate_service
        .replace_cv(vacancy_id, candidate_id, cv)
        .await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}/candidates/{candidate_id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 204, description = "Candidate deleted"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .delete(vacancy_id, candidate_id)
        .await?;
    state.capture_service.forget(vacancy_id, candidate_id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/cv-summary",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID"),
        ("refresh" = Option<bool>, Query, description = "Regenerate even when cached")
    ),
    responses(
        (status = 200, description = "Cached or freshly generated CV summary", body = CvSummaryResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_cv_summary(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<CvSummaryQuery>,
) -> Result<impl IntoResponse> {
    let (cv_summary, cached) = state
        .summary_service
        .summarize_cv(vacancy_id, candidate_id, query.refresh)
        .await?;
    Ok(Json(CvSummaryResponse { cv_summary, cached }))
}
