pub mod candidate_routes;
pub mod export;
pub mod extract;
pub mod files;
pub mod health;
pub mod interview;
pub mod vacancy;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::require_bearer_auth,
    cors::permissive_cors,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Assembles every route group with its middleware.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let base_routes = Router::new().route("/health", get(health::health));

    let recruiter_api = Router::new()
        .route(
            "/api/vacancies",
            get(vacancy::list_vacancies).post(vacancy::create_vacancy),
        )
        .route(
            "/api/vacancies/:id",
            get(vacancy::get_vacancy)
                .patch(vacancy::update_vacancy)
                .delete(vacancy::delete_vacancy),
        )
        .route(
            "/api/vacancies/:id/toggle-status",
            post(vacancy::toggle_vacancy_status),
        )
        .route("/api/vacancies/:id/export", get(export::export_vacancy))
        .route(
            "/api/vacancies/:id/interview-summary",
            post(interview::summarize_interviews),
        )
        .route(
            "/api/vacancies/:id/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id",
            get(candidate_routes::get_candidate)
                .patch(candidate_routes::update_candidate)
                .delete(candidate_routes::delete_candidate),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/cv",
            put(candidate_routes::replace_candidate_cv),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/cv-summary",
            get(candidate_routes::get_cv_summary),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/interview",
            get(interview::get_session).delete(interview::reset_session),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/interview/capture",
            post(interview::capture),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/interview/save",
            post(interview::save_session),
        )
        .route(
            "/api/vacancies/:id/candidates/:candidate_id/interview/turns",
            get(interview::list_turns),
        )
        .layer(from_fn_with_state(state.clone(), require_bearer_auth))
        .layer(from_fn_with_state(
            new_rps_state(config.api_rps),
            rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/extract-pdf-text", get(extract::extract_pdf_text))
        .route("/files/*path", get(files::download_file))
        .layer(from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ));

    base_routes
        .merge(recruiter_api)
        .merge(public_api)
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
