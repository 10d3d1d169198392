mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::Value as JsonValue;
use vacantes_backend::services::speech_service::SpeechError;

use common::*;

struct Interview {
    app: TestApp,
    base: String,
}

async fn interview_with(speech: MockSpeech) -> Interview {
    let app = app_with(
        Arc::new(speech),
        Arc::new(MockGenerator::new()),
        Arc::new(MockExtractor::new()),
    );
    let vacancy_id = id_of(&create_vacancy(&app, "QA Engineer").await);
    let candidate_id = id_of(&create_candidate(&app, &vacancy_id, "Ana").await);
    Interview {
        base: format!("/api/vacancies/{}/candidates/{}/interview", vacancy_id, candidate_id),
        app,
    }
}

async fn interview() -> Interview {
    interview_with(MockSpeech::new()).await
}

impl Interview {
    async fn capture_text(&self, role: &str, text: &str) -> (StatusCode, JsonValue) {
        let req = MultipartBody::new()
            .text("role", role)
            .text("text", text)
            .into_request(Method::POST, &format!("{}/capture", self.base));
        send(&self.app, req).await
    }

    async fn capture_audio(&self, role: &str) -> (StatusCode, JsonValue) {
        let req = MultipartBody::new()
            .text("role", role)
            .file("audio", "clip.wav", "audio/wav", b"RIFF....WAVEfmt ")
            .into_request(Method::POST, &format!("{}/capture", self.base));
        send(&self.app, req).await
    }

    async fn session(&self) -> JsonValue {
        let (status, body) = send(&self.app, json_request(Method::GET, &self.base, None)).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn stored_turns(&self) -> Vec<JsonValue> {
        let (status, body) = send(
            &self.app,
            json_request(Method::GET, &format!("{}/turns", self.base), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

#[tokio::test]
async fn new_session_awaits_a_question() {
    let it = interview().await;
    let session = it.session().await;
    assert_eq!(session["state"], "awaiting_question");
    assert_eq!(session["nextTurnId"], 0);
    assert_eq!(session["questionEnabled"], true);
    assert_eq!(session["answerEnabled"], false);
    assert!(session["turns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn question_then_answer_produces_one_stored_turn() {
    let it = interview().await;

    let (status, session) = it.capture_text("question", "¿Cuál es tu experiencia?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"], "awaiting_answer");
    assert_eq!(session["answerEnabled"], true);
    assert_eq!(session["turns"][0]["response"], "");

    let (status, session) = it.capture_text("answer", "Cinco años en QA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"], "awaiting_question");
    assert_eq!(session["nextTurnId"], 1);
    assert_eq!(session["turns"].as_array().unwrap().len(), 1);

    let stored = it.stored_turns().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["id"], 0);
    assert_eq!(stored[0]["question"], "¿Cuál es tu experiencia?");
    assert_eq!(stored[0]["response"], "Cinco años en QA");
}

#[tokio::test]
async fn out_of_order_captures_conflict_and_change_nothing() {
    let it = interview().await;

    let (status, _) = it.capture_text("answer", "Sí").await;
    assert_eq!(status, StatusCode::CONFLICT);

    it.capture_text("question", "¿Primera?").await;
    let (status, body) = it.capture_text("question", "¿Segunda?").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let session = it.session().await;
    assert_eq!(session["state"], "awaiting_answer");
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["question"], "¿Primera?");
}

#[tokio::test]
async fn audio_is_transcribed_by_the_recognizer() {
    let mut speech = MockSpeech::new();
    speech
        .expect_recognize_once()
        .withf(|clip| clip.content_type == "audio/wav" && !clip.data.is_empty())
        .times(1)
        .returning(|_| Ok("¿Por qué quieres trabajar aquí?".into()));
    let it = interview_with(speech).await;

    let (status, session) = it.capture_audio("question").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["turns"][0]["question"], "¿Por qué quieres trabajar aquí?");
}

#[tokio::test]
async fn recognition_failures_leave_the_session_unchanged() {
    let mut speech = MockSpeech::new();
    let mut seq = mockall::Sequence::new();
    speech
        .expect_recognize_once()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(SpeechError::NoMatch));
    speech
        .expect_recognize_once()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(SpeechError::Canceled("AuthenticationFailure".into())));
    let it = interview_with(speech).await;

    let (status, _) = it.capture_audio("question").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = it.capture_audio("question").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let session = it.session().await;
    assert_eq!(session["state"], "awaiting_question");
    assert_eq!(session["nextTurnId"], 0);
    assert!(session["turns"].as_array().unwrap().is_empty());
    assert!(it.stored_turns().await.is_empty());
}

#[tokio::test]
async fn disabled_role_is_rejected_before_recognition() {
    // The recognizer has no expectations: calling it would fail the test.
    let it = interview().await;
    let (status, _) = it.capture_audio("answer").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn capture_requires_role_and_input() {
    let it = interview().await;

    let req = MultipartBody::new()
        .text("text", "hola")
        .into_request(Method::POST, &format!("{}/capture", it.base));
    let (status, _) = send(&it.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = MultipartBody::new()
        .text("role", "question")
        .into_request(Method::POST, &format!("{}/capture", it.base));
    let (status, _) = send(&it.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = it.capture_text("comment", "hola").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saving_an_empty_session_is_rejected() {
    let it = interview().await;
    let (status, body) = send(
        &it.app,
        json_request(Method::POST, &format!("{}/save", it.base), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn save_replaces_the_stored_transcript() {
    let it = interview().await;
    for (q, a) in [("¿Uno?", "1"), ("¿Dos?", "2")] {
        it.capture_text("question", q).await;
        it.capture_text("answer", a).await;
    }
    assert_eq!(it.stored_turns().await.len(), 2);

    let (status, session) = send(&it.app, json_request(Method::DELETE, &it.base, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(session["turns"].as_array().unwrap().is_empty());
    assert_eq!(session["nextTurnId"], 0);
    // Reset only clears the local session.
    assert_eq!(it.stored_turns().await.len(), 2);

    it.capture_text("question", "¿Tres?").await;
    it.capture_text("answer", "3").await;

    let (status, saved) = send(
        &it.app,
        json_request(Method::POST, &format!("{}/save", it.base), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["saved"], 1);

    let stored = it.stored_turns().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["question"], "¿Tres?");
    assert_eq!(stored[0]["response"], "3");
}

#[tokio::test]
async fn unknown_candidate_has_no_session() {
    let it = interview().await;
    let vacancy_id = id_of(&create_vacancy(&it.app, "Otra").await);
    let uri = format!(
        "/api/vacancies/{}/candidates/{}/interview",
        vacancy_id,
        uuid::Uuid::new_v4()
    );
    let (status, _) = send(&it.app, json_request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn idle_sessions_are_evicted() {
    let it = interview().await;
    it.capture_text("question", "¿Uno?").await;
    assert_eq!(it.app.state.capture_service.active_sessions().await, 1);

    let evicted = it
        .app
        .state
        .capture_service
        .evict_idle(std::time::Duration::ZERO)
        .await;
    assert_eq!(evicted, 1);

    let session = it.session().await;
    assert!(session["turns"].as_array().unwrap().is_empty());
    assert_eq!(it.stored_turns().await.len(), 1);
}
