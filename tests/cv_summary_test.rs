mod common;

use std::sync::Arc;

use anyhow::anyhow;
use axum::http::{Method, StatusCode};
use serde_json::json;
use vacantes_backend::services::{
    extract_service::ExtractError,
    summary_service::{CV_SUMMARY_UNAVAILABLE, INSUFFICIENT_CV_INFO},
};

use common::*;

const CV_TEXT: &str = "María Gómez. Ingeniera de datos con seis años de experiencia en Python, SQL y Spark.";

async fn candidate_summary_uri(app: &TestApp) -> String {
    let vacancy_id = id_of(&create_vacancy(app, "Data Engineer").await);
    let candidate_id = id_of(&create_candidate(app, &vacancy_id, "María").await);
    format!(
        "/api/vacancies/{}/candidates/{}/cv-summary",
        vacancy_id, candidate_id
    )
}

fn extractor_returning(text: &'static str, times: usize) -> MockExtractor {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract_text()
        .withf(|url| url.starts_with(PUBLIC_BASE_URL) && url.contains("/files/cvs/"))
        .times(times)
        .returning(move |_| Ok(text.to_string()));
    extractor
}

#[tokio::test]
async fn summary_is_generated_once_then_served_from_cache() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|prompt| prompt.contains(CV_TEXT))
        .times(1)
        .returning(|_| Ok("  Ingeniera de datos con experiencia en Spark.  ".into()));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(generator),
        Arc::new(extractor_returning(CV_TEXT, 1)),
    );
    let uri = candidate_summary_uri(&app).await;

    let (status, first) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["cvSummary"], "Ingeniera de datos con experiencia en Spark.");
    assert_eq!(first["cached"], false);

    let (status, second) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cvSummary"], first["cvSummary"]);
    assert_eq!(second["cached"], true);

    let candidate_uri = uri.trim_end_matches("/cv-summary");
    let (_, candidate) = send(&app, json_request(Method::GET, candidate_uri, None)).await;
    assert_eq!(candidate["cvSummary"], first["cvSummary"]);
}

#[tokio::test]
async fn refresh_regenerates_a_cached_summary() {
    let mut generator = MockGenerator::new();
    let mut seq = mockall::Sequence::new();
    generator
        .expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("Primera versión".into()));
    generator
        .expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("Segunda versión".into()));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(generator),
        Arc::new(extractor_returning(CV_TEXT, 2)),
    );
    let uri = candidate_summary_uri(&app).await;

    send(&app, json_request(Method::GET, &uri, None)).await;
    let (_, refreshed) = send(
        &app,
        json_request(Method::GET, &format!("{}?refresh=true", uri), None),
    )
    .await;
    assert_eq!(refreshed["cvSummary"], "Segunda versión");
    assert_eq!(refreshed["cached"], false);
}

#[tokio::test]
async fn short_cv_text_yields_the_insufficient_info_message() {
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(MockGenerator::new()),
        Arc::new(extractor_returning("   María Gómez   ", 1)),
    );
    let uri = candidate_summary_uri(&app).await;

    let (_, first) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(first["cvSummary"], INSUFFICIENT_CV_INFO);
    assert_eq!(first["cached"], false);

    let (_, second) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(second["cvSummary"], INSUFFICIENT_CV_INFO);
    assert_eq!(second["cached"], true);
}

#[tokio::test]
async fn generation_failure_stores_the_placeholder() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .returning(|_| Err(anyhow!("Gemini API Error 503")));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(generator),
        Arc::new(extractor_returning(CV_TEXT, 1)),
    );
    let uri = candidate_summary_uri(&app).await;

    let (status, body) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cvSummary"], CV_SUMMARY_UNAVAILABLE);

    let (_, cached) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(cached["cvSummary"], CV_SUMMARY_UNAVAILABLE);
    assert_eq!(cached["cached"], true);
}

#[tokio::test]
async fn extraction_failure_stores_the_placeholder() {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract_text()
        .times(1)
        .returning(|_| Err(ExtractError::Status(404)));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(MockGenerator::new()),
        Arc::new(extractor),
    );
    let uri = candidate_summary_uri(&app).await;

    let (status, body) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cvSummary"], CV_SUMMARY_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_candidate_summary_is_not_found() {
    let app = app();
    let vacancy_id = id_of(&create_vacancy(&app, "Data Engineer").await);
    let uri = format!(
        "/api/vacancies/{}/candidates/{}/cv-summary",
        vacancy_id,
        uuid::Uuid::new_v4()
    );
    let (status, _) = send(&app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn record_turn(app: &TestApp, vacancy_id: &str, candidate_id: &str, q: &str, a: &str) {
    let uri = format!(
        "/api/vacancies/{}/candidates/{}/interview/capture",
        vacancy_id, candidate_id
    );
    for (role, text) in [("question", q), ("answer", a)] {
        let req = MultipartBody::new()
            .text("role", role)
            .text("text", text)
            .into_request(Method::POST, &uri);
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }
}

#[tokio::test]
async fn interview_summary_numbers_each_interviewee() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|prompt| {
            prompt.contains("50 palabras")
                && prompt.contains("Entrevistado 1:\nPregunta: ¿Experiencia?\nRespuesta: Cinco años")
                && prompt.contains("Entrevistado 2:\nPregunta: ¿Experiencia?\nRespuesta: Ninguna")
        })
        .times(1)
        .returning(|_| Ok("Entrevistado 1:\nMuy sólido.\n\nEntrevistado 2:\nSin experiencia.".into()));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(generator),
        Arc::new(MockExtractor::new()),
    );

    let vacancy_id = id_of(&create_vacancy(&app, "QA Engineer").await);
    let first = id_of(&create_candidate(&app, &vacancy_id, "Ana").await);
    let second = id_of(&create_candidate(&app, &vacancy_id, "Luis").await);
    // A candidate without a transcript is left out.
    create_candidate(&app, &vacancy_id, "Eva").await;
    record_turn(&app, &vacancy_id, &first, "¿Experiencia?", "Cinco años").await;
    record_turn(&app, &vacancy_id, &second, "¿Experiencia?", "Ninguna").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/vacancies/{}/interview-summary", vacancy_id),
            Some(json!({ "style": "per_candidate" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["style"], "per_candidate");
    assert_eq!(body["interviewees"], 2);
    assert_eq!(
        body["lines"],
        json!(["Entrevistado 1:", "Muy sólido.", "Entrevistado 2:", "Sin experiencia."])
    );
}

#[tokio::test]
async fn interview_summary_needs_saved_turns() {
    let app = app();
    let vacancy_id = id_of(&create_vacancy(&app, "QA Engineer").await);
    create_candidate(&app, &vacancy_id, "Ana").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/vacancies/{}/interview-summary", vacancy_id),
            Some(json!({ "style": "general" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn interview_summary_generation_failure_is_a_bad_gateway() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .times(1)
        .returning(|_| Err(anyhow!("timeout")));
    let app = app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(generator),
        Arc::new(MockExtractor::new()),
    );
    let vacancy_id = id_of(&create_vacancy(&app, "QA Engineer").await);
    let candidate = id_of(&create_candidate(&app, &vacancy_id, "Ana").await);
    record_turn(&app, &vacancy_id, &candidate, "¿Uno?", "Sí").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/vacancies/{}/interview-summary", vacancy_id),
            Some(json!({ "style": "best_candidate" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
