use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::interview_dto::{InterviewSummaryPayload, SaveSessionResponse, SessionResponse},
    error::{Error, Result},
    models::interview::InterviewTurn,
    services::{
        capture_service::{CaptureInput, CaptureRole},
        speech_service::AudioClip,
    },
    AppState,
};

fn parse_role(raw: &str) -> Result<CaptureRole> {
    match raw.trim() {
        "question" => Ok(CaptureRole::Question),
        "answer" => Ok(CaptureRole::Answer),
        other => Err(Error::BadRequest(format!(
            "Unknown capture role: {} (expected question or answer)",
            other
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/interview",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Current capture session", body = SessionResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let snapshot = state
        .capture_service
        .session(vacancy_id, candidate_id)
        .await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

/// Multipart form with `role` (`question` or `answer`) and either an `audio`
/// clip or already-recognized `text`.
#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/interview/capture",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "role plus audio or text"),
    responses(
        (status = 200, description = "Turn recorded", body = SessionResponse),
        (status = 400, description = "Missing role or input"),
        (status = 409, description = "Role not enabled in the current state"),
        (status = 422, description = "No speech recognized"),
        (status = 502, description = "Speech service failure")
    )
)]
#[axum::debug_handler]
pub async fn capture(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut role = None;
    let mut input = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "role" => role = Some(parse_role(&field.text().await?)?),
            "text" => input = Some(CaptureInput::Text(field.text().await?)),
            "audio" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("audio/wav; codecs=audio/pcm; samplerate=16000")
                    .to_string();
                let data = field.bytes().await?;
                if data.is_empty() {
                    return Err(Error::BadRequest("audio must not be empty".into()));
                }
                input = Some(CaptureInput::Audio(AudioClip { data, content_type }));
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let role = role.ok_or_else(|| Error::BadRequest("role is required".into()))?;
    let input = input.ok_or_else(|| Error::BadRequest("audio or text is required".into()))?;

    let snapshot = state
        .capture_service
        .capture(vacancy_id, candidate_id, role, input)
        .await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/interview",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Session cleared; stored turns untouched", body = SessionResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn reset_session(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let snapshot = state.capture_service.reset(vacancy_id, candidate_id).await?;
    Ok(Json(SessionResponse::from(snapshot)))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/interview/save",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Stored transcript replaced", body = SaveSessionResponse),
        (status = 400, description = "Nothing to save"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn save_session(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let turns = state.capture_service.save(vacancy_id, candidate_id).await?;
    Ok(Json(SaveSessionResponse {
        saved: turns.len(),
        turns,
    }))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}/candidates/{candidate_id}/interview/turns",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID"),
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Stored transcript", body = [InterviewTurn]),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn list_turns(
    State(state): State<AppState>,
    Path((vacancy_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let turns: Vec<InterviewTurn> = state
        .capture_service
        .list_turns(vacancy_id, candidate_id)
        .await?;
    Ok(Json(turns))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/interview-summary",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    request_body = InterviewSummaryPayload,
    responses(
        (status = 200, description = "Generated summary", body = InterviewSummaryResponse),
        (status = 400, description = "No saved interviews"),
        (status = 404, description = "Vacancy not found"),
        (status = 502, description = "Generation failed")
    )
)]
#[axum::debug_handler]
pub async fn summarize_interviews(
    State(state): State<AppState>,
    Path(vacancy_id): Path<Uuid>,
    Json(payload): Json<InterviewSummaryPayload>,
) -> Result<impl IntoResponse> {
    let summary = state
        .summary_service
        .summarize_interviews(vacancy_id, payload.style)
        .await?;
    Ok(Json(summary))
}
