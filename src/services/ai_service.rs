use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Freeform text generation from a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewSummaryStyle {
    /// One summary across every interviewee.
    General,
    /// A short summary per interviewee.
    PerCandidate,
    /// Pick the best interviewee and justify the choice.
    BestCandidate,
}

const ASSISTANT_PREAMBLE: &str = "A partir de ahora te comportarás como un asistente para entrevistas que habla en español.
Tu responsabilidad será ayudar al entrevistador con las tareas que se te encomendarán.
Tu recibes las preguntas y respuestas de los entrevistados. No debes de usar markdown.";

pub fn interview_summary_prompt(style: InterviewSummaryStyle, transcript: &str) -> String {
    let task = match style {
        InterviewSummaryStyle::General => {
            "Genera un resumen sobre las siguientes respuestas de los entrevistados en español.
El resumen debe de ser general sobre todos los entrevistados y no ir sobre cada una de las respuestas.
No debes de sobrepasar más de 75 palabras."
        }
        InterviewSummaryStyle::PerCandidate => {
            "Genera un resumen general sobre cada entrevistado en español. El resumen debe de ser general
sobre cada uno de los entrevistados y cada resumen de entrevistado no debe de sobrepasar más de 50 palabras.

El formato de entrega debe de ser el siguiente:

Entrevistado 1:
[Resumen de 50 palabras]

Entrevistado 2:
[Resumen de 50 palabras]"
        }
        InterviewSummaryStyle::BestCandidate => {
            "Deberás de escoger quien es el candidato ideal para el puesto de trabajo en base a las preguntas realizadas.
¿Por qué se acomoda mejor para el puesto?, ¿Por qué es mejor que los demás candidatos?, ¿Qué habilidades lo hacen destacar?

El formato de entrega debe de ser el siguiente:
\"El candidato ideal para el puesto es el entrevistado [Número de entrevistado] porque...\""
        }
    };

    format!(
        "{}\n\n{}\n\nAquí te brindo las preguntas y respuestas de cada entrevistado:\n{}",
        ASSISTANT_PREAMBLE, task, transcript
    )
}

pub fn cv_summary_prompt(cv_text: &str) -> String {
    format!(
        "Eres un asistente de reclutamiento que habla en español. No debes de usar markdown.
Resume el siguiente currículum en un máximo de 120 palabras. Incluye la formación, la experiencia
laboral más relevante, las habilidades técnicas y los idiomas del candidato. Si algún dato no aparece,
no lo inventes.

Currículum:
{}",
        cv_text
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not configured"))?;

        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let res = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_API_BASE, self.model))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API Error {}: {}", status, text));
        }

        let body: JsonValue = res.json().await?;
        extract_text(&body).ok_or_else(|| anyhow!("Invalid Gemini response format"))
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &JsonValue) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_joined_parts_of_first_candidate() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "Perfil sólido "}, {"text": "en backend."}]}},
                {"content": {"parts": [{"text": "ignorado"}]}}
            ]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("Perfil sólido en backend."));
    }

    #[test]
    fn blocked_or_empty_responses_have_no_text() {
        assert_eq!(extract_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})), None);
        assert_eq!(
            extract_text(&json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]})),
            None
        );
    }

    #[test]
    fn prompts_embed_the_source_text() {
        let prompt = interview_summary_prompt(InterviewSummaryStyle::PerCandidate, "Entrevistado 1:\nPregunta: x");
        assert!(prompt.starts_with(ASSISTANT_PREAMBLE));
        assert!(prompt.contains("50 palabras"));
        assert!(prompt.ends_with("Entrevistado 1:\nPregunta: x"));
        assert!(cv_summary_prompt("Ingeniera de datos").ends_with("Ingeniera de datos"));
    }
}
