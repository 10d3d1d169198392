pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::database::RecruitingStore;
use crate::services::{
    ai_service::{GeminiClient, TextGenerator},
    candidate_service::CandidateService,
    capture_service::CaptureService,
    export_service::ExportService,
    extract_service::{PdfTextExtractor, TextExtractor},
    speech_service::{AzureSpeechClient, SpeechRecognizer},
    storage_service::{BlobStore, LocalBlobStore},
    summary_service::SummaryService,
    vacancy_service::VacancyService,
};
use reqwest::Client;
use std::sync::Arc;

/// The external systems the services talk to.
pub struct Backends {
    pub store: Arc<dyn RecruitingStore>,
    pub speech: Arc<dyn SpeechRecognizer>,
    pub generator: Arc<dyn TextGenerator>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl Backends {
    /// Azure Speech, Gemini and the HTTP PDF extractor around the given store.
    pub fn from_config(config: &Config, store: Arc<dyn RecruitingStore>) -> error::Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            store,
            speech: Arc::new(AzureSpeechClient::new(
                config.azure_speech_key.clone(),
                config.azure_speech_region.clone(),
                config.speech_language.clone(),
                http_client.clone(),
            )),
            generator: Arc::new(GeminiClient::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
                http_client.clone(),
            )),
            extractor: Arc::new(PdfTextExtractor::new(http_client)),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub blobs: Arc<LocalBlobStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub vacancy_service: VacancyService,
    pub candidate_service: CandidateService,
    pub capture_service: CaptureService,
    pub summary_service: SummaryService,
    pub export_service: ExportService,
}

impl AppState {
    pub fn new(config: Config, backends: Backends) -> Self {
        let blobs = Arc::new(LocalBlobStore::new(
            &config.uploads_dir,
            &config.public_base_url,
            &config.file_url_secret,
        ));
        let blob_store: Arc<dyn BlobStore> = blobs.clone();
        let Backends {
            store,
            speech,
            generator,
            extractor,
        } = backends;

        let vacancy_service = VacancyService::new(store.clone(), blob_store.clone());
        let candidate_service = CandidateService::new(store.clone(), blob_store);
        let capture_service = CaptureService::new(store.clone(), speech);
        let summary_service = SummaryService::new(store.clone(), extractor.clone(), generator);
        let export_service = ExportService::new(store);

        Self {
            config: Arc::new(config),
            blobs,
            extractor,
            vacancy_service,
            candidate_service,
            capture_service,
            summary_service,
            export_service,
        }
    }
}
