#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use jsonwebtoken::{encode, EncodingKey, Header};
use mockall::mock;
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;
use tower::ServiceExt;

use vacantes_backend::{
    config::{Config, LogFormat},
    database::MemoryStore,
    middleware::auth::Claims,
    routes::build_router,
    services::{
        ai_service::TextGenerator,
        extract_service::{ExtractError, TextExtractor},
        speech_service::{AudioClip, SpeechError, SpeechRecognizer},
    },
    AppState, Backends,
};

pub const JWT_SECRET: &str = "test_secret_key";
pub const FILE_URL_SECRET: &str = "file_secret_key";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8080";
pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\ntrailer << /Root 1 0 R >>\n%%EOF\n";

mock! {
    pub Generator {}

    #[async_trait]
    impl TextGenerator for Generator {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
    }
}

mock! {
    pub Speech {}

    #[async_trait]
    impl SpeechRecognizer for Speech {
        async fn recognize_once(&self, clip: AudioClip) -> Result<String, SpeechError>;
    }
}

mock! {
    pub Extractor {}

    #[async_trait]
    impl TextExtractor for Extractor {
        async fn extract_text(&self, url: &str) -> Result<String, ExtractError>;
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _uploads: TempDir,
}

pub fn test_config(uploads_dir: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: None,
        jwt_secret: JWT_SECRET.into(),
        file_url_secret: FILE_URL_SECRET.into(),
        public_base_url: PUBLIC_BASE_URL.into(),
        uploads_dir: uploads_dir.into(),
        gemini_api_key: None,
        gemini_model: "gemini-2.5-flash".into(),
        azure_speech_key: None,
        azure_speech_region: None,
        speech_language: "es-ES".into(),
        api_rps: 1000,
        public_rps: 1000,
        capture_session_idle_secs: 1800,
        log_format: LogFormat::Text,
    }
}

/// Builds the full router over an in-memory store and the given vendor doubles.
pub fn app_with(
    speech: Arc<dyn SpeechRecognizer>,
    generator: Arc<dyn TextGenerator>,
    extractor: Arc<dyn TextExtractor>,
) -> TestApp {
    let uploads = TempDir::new().expect("temp uploads dir");
    let config = test_config(&uploads.path().to_string_lossy());
    let backends = Backends {
        store: Arc::new(MemoryStore::new()),
        speech,
        generator,
        extractor,
    };
    let state = AppState::new(config, backends);
    TestApp {
        router: build_router(state.clone()),
        state,
        _uploads: uploads,
    }
}

/// Router whose vendor doubles fail the test if they are ever called.
pub fn app() -> TestApp {
    app_with(
        Arc::new(MockSpeech::new()),
        Arc::new(MockGenerator::new()),
        Arc::new(MockExtractor::new()),
    )
}

pub fn bearer_token() -> String {
    let claims = Claims {
        sub: "recruiter-1".into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some("hr".into()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token");
    format!("Bearer {}", token)
}

pub fn json_request(method: Method, uri: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer_token());
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send_raw(app: &TestApp, req: Request<Body>) -> (StatusCode, Bytes) {
    let res = app.router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

pub async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, JsonValue) {
    let (status, body) = send_raw(app, req).await;
    let json = if body.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| json!(String::from_utf8_lossy(&body)))
    };
    (status, json)
}

/// Minimal multipart/form-data encoder.
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----vacantes-test-boundary".into(),
            buf: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: Method, uri: &str) -> Request<Body> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer_token())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.buf))
            .unwrap()
    }
}

pub fn candidate_form(first_name: &str) -> MultipartBody {
    MultipartBody::new()
        .text("nombre", first_name)
        .text("apellido", "Pérez")
        .text("correo", "candidato@example.com")
        .text("telefono", "+34 600 000 000")
}

pub async fn create_vacancy(app: &TestApp, title: &str) -> JsonValue {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/vacancies",
            Some(json!({ "puesto": title, "descripcion": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

pub async fn create_candidate(app: &TestApp, vacancy_id: &str, first_name: &str) -> JsonValue {
    let req = candidate_form(first_name)
        .file("cv", "cv.pdf", "application/pdf", SAMPLE_PDF)
        .into_request(Method::POST, &format!("/api/vacancies/{}/candidates", vacancy_id));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

pub fn id_of(value: &JsonValue) -> String {
    value["id"].as_str().expect("id").to_string()
}

/// Path and query of a signed download URL.
pub fn local_uri(url: &str) -> String {
    url.strip_prefix(PUBLIC_BASE_URL).unwrap_or(url).to_string()
}
