//! Single-utterance speech recognition.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("No speech could be recognized")]
    NoMatch,

    #[error("Recognition canceled: {0}")]
    Canceled(String),

    #[error("Speech service is not configured")]
    NotConfigured,

    #[error("Speech service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognizes one utterance and returns its display text.
    async fn recognize_once(&self, clip: AudioClip) -> Result<String, SpeechError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ShortAudioResponse {
    recognition_status: String,
    display_text: Option<String>,
}

/// Azure Speech short-audio REST recognizer with a fixed locale.
#[derive(Clone)]
pub struct AzureSpeechClient {
    client: Client,
    subscription_key: Option<String>,
    region: Option<String>,
    language: String,
}

impl AzureSpeechClient {
    pub fn new(
        subscription_key: Option<String>,
        region: Option<String>,
        language: String,
        client: Client,
    ) -> Self {
        Self {
            client,
            subscription_key,
            region,
            language,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for AzureSpeechClient {
    async fn recognize_once(&self, clip: AudioClip) -> Result<String, SpeechError> {
        let (Some(key), Some(region)) = (&self.subscription_key, &self.region) else {
            return Err(SpeechError::NotConfigured);
        };

        let endpoint = format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            region
        );

        let res = self
            .client
            .post(&endpoint)
            .query(&[("language", self.language.as_str()), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", key)
            .header(reqwest::header::CONTENT_TYPE, &clip.content_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(clip.data)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "speech recognition request rejected");
            return Err(SpeechError::Canceled(format!("HTTP {}", status)));
        }

        let body: ShortAudioResponse = res.json().await?;
        interpret(body)
    }
}

fn interpret(body: ShortAudioResponse) -> Result<String, SpeechError> {
    match body.recognition_status.as_str() {
        "Success" => {
            let text = body.display_text.unwrap_or_default().trim().to_string();
            if text.is_empty() {
                Err(SpeechError::NoMatch)
            } else {
                Ok(text)
            }
        }
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => Err(SpeechError::NoMatch),
        other => Err(SpeechError::Canceled(other.to_string())),
    }
}
