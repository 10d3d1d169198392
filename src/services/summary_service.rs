use std::sync::Arc;
use uuid::Uuid;

use crate::database::RecruitingStore;
use crate::dto::interview_dto::InterviewSummaryResponse;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::interview::transcript_text;
use crate::services::ai_service::{
    cv_summary_prompt, interview_summary_prompt, InterviewSummaryStyle, TextGenerator,
};
use crate::services::extract_service::TextExtractor;

pub const INSUFFICIENT_CV_INFO: &str =
    "No hay suficiente información en el CV para generar un resumen.";
pub const CV_SUMMARY_UNAVAILABLE: &str = "No se pudo generar el resumen del CV.";

/// CVs whose extracted text is shorter than this are not worth summarizing.
const MIN_CV_TEXT_CHARS: usize = 20;

#[derive(Clone)]
pub struct SummaryService {
    store: Arc<dyn RecruitingStore>,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn TextGenerator>,
}

impl SummaryService {
    pub fn new(
        store: Arc<dyn RecruitingStore>,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            extractor,
            generator,
        }
    }

    /// Returns the candidate's CV summary and whether it came from the cache.
    /// Any extraction or generation failure is stored as a fixed placeholder.
    pub async fn summarize_cv(
        &self,
        vacancy_id: Uuid,
        candidate_id: Uuid,
        refresh: bool,
    ) -> Result<(String, bool)> {
        let candidate = self
            .store
            .get_candidate(vacancy_id, candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;

        if !refresh {
            if let Some(cached) = candidate.cached_summary() {
                return Ok((cached.to_string(), true));
            }
        }

        let summary = self.generate_cv_summary(&candidate).await;
        self.store
            .set_cv_summary(vacancy_id, candidate_id, &summary)
            .await?;
        Ok((summary, false))
    }

    async fn generate_cv_summary(&self, candidate: &Candidate) -> String {
        let Some(cv_url) = candidate.cv_url.as_deref() else {
            return INSUFFICIENT_CV_INFO.to_string();
        };

        let text = match self.extractor.extract_text(cv_url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(candidate_id = %candidate.id, error = %e, "CV text extraction failed");
                return CV_SUMMARY_UNAVAILABLE.to_string();
            }
        };

        let text = text.trim();
        if text.chars().count() < MIN_CV_TEXT_CHARS {
            return INSUFFICIENT_CV_INFO.to_string();
        }

        match self.generator.generate(&cv_summary_prompt(text)).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                tracing::error!(candidate_id = %candidate.id, error = ?e, "CV summary generation failed");
                CV_SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn summarize_interviews(
        &self,
        vacancy_id: Uuid,
        style: InterviewSummaryStyle,
    ) -> Result<InterviewSummaryResponse> {
        self.store
            .get_vacancy(vacancy_id)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))?;

        let mut candidates = self.store.list_candidates(vacancy_id).await?;
        candidates.sort_by_key(|c| c.created_at);

        let mut blocks = Vec::new();
        for candidate in &candidates {
            let turns = self.store.list_turns(candidate.id).await?;
            if turns.is_empty() {
                continue;
            }
            blocks.push(format!(
                "Entrevistado {}:\n{}",
                blocks.len() + 1,
                transcript_text(&turns)
            ));
        }

        if blocks.is_empty() {
            return Err(Error::BadRequest(
                "No hay entrevistas guardadas para esta vacante.".into(),
            ));
        }

        let prompt = interview_summary_prompt(style, &blocks.join("\n"));
        let summary = self.generator.generate(&prompt).await.map_err(|e| {
            tracing::error!(vacancy_id = %vacancy_id, error = ?e, "interview summary generation failed");
            Error::Upstream("No se pudo generar el resumen de las entrevistas.".into())
        })?;

        let lines = summary
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(InterviewSummaryResponse {
            style,
            interviewees: blocks.len(),
            summary,
            lines,
        })
    }
}
