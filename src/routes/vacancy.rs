use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::vacancy_dto::{
        CreateVacancyPayload, UpdateVacancyPayload, VacancyListQuery, VacancyListResponse,
        VacancyResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/vacancies",
    request_body = CreateVacancyPayload,
    responses(
        (status = 201, description = "Vacancy created", body = VacancyResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_vacancy(
    State(state): State<AppState>,
    Json(payload): Json<CreateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let vacancy = state.vacancy_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(VacancyResponse::from(vacancy))))
}

#[utoipa::path(
    get,
    path = "/api/vacancies",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<i64>, Query, description = "Page size (1-100)"),
        ("estado" = Option<String>, Query, description = "Abierta or Cerrada"),
        ("search" = Option<String>, Query, description = "Matches title or description")
    ),
    responses(
        (status = 200, description = "Vacancies, newest first", body = VacancyListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_vacancies(
    State(state): State<AppState>,
    Query(query): Query<VacancyListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.vacancy_service.list(query).await?;
    Ok(Json(VacancyListResponse::from(list)))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    responses(
        (status = 200, description = "Vacancy", body = VacancyResponse),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.get_by_id(id).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    patch,
    path = "/api/vacancies/{id}",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    request_body = UpdateVacancyPayload,
    responses(
        (status = 200, description = "Vacancy updated", body = VacancyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let vacancy = state.vacancy_service.update(id, payload).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    responses(
        (status = 200, description = "Status flipped between Abierta and Cerrada", body = VacancyResponse),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn toggle_vacancy_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.toggle_status(id).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}",
    params(("id" = Uuid, Path, description = "Vacancy ID")),
    responses(
        (status = 204, description = "Vacancy and its candidates deleted"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.vacancy_service.delete(id).await?;
    state.capture_service.forget_vacancy(id).await;
    Ok(StatusCode::NO_CONTENT)
}
