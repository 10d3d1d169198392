use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("a valid http(s) PDF URL is required")]
    InvalidUrl,

    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download returned HTTP {0}")]
    Status(u16),

    #[error("PDF parsing failed: {0}")]
    Parse(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Downloads the document at `url` and returns its plain text.
    async fn extract_text(&self, url: &str) -> Result<String, ExtractError>;
}

pub fn parse_pdf_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw.trim()).map_err(|_| ExtractError::InvalidUrl)?;
    let supported = matches!(url.scheme(), "http" | "https") && url.host().is_some();
    if supported {
        Ok(url)
    } else {
        Err(ExtractError::InvalidUrl)
    }
}

#[derive(Clone)]
pub struct PdfTextExtractor {
    client: Client,
}

impl PdfTextExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, url: &str) -> Result<String, ExtractError> {
        let url = parse_pdf_url(url)?;

        let res = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(60))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(ExtractError::Status(res.status().as_u16()));
        }
        let data = res.bytes().await?;
        tracing::debug!(%url, bytes = data.len(), "PDF downloaded");

        // pdf-extract is synchronous and may panic on malformed input.
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| ExtractError::Parse(format!("extraction task failed: {}", e)))?
            .map_err(|e| ExtractError::Parse(e.to_string()))
    }
}
