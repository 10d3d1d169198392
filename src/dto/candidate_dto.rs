use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::CandidateChanges;
use crate::models::candidate::Candidate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatePayload {
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, max = 120))]
    pub first_name: Option<String>,
    #[serde(rename = "apellido")]
    #[validate(length(min = 1, max = 120))]
    pub last_name: Option<String>,
    #[serde(rename = "correo")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(rename = "telefono")]
    #[validate(length(max = 40))]
    pub phone: Option<String>,
}

impl From<UpdateCandidatePayload> for CandidateChanges {
    fn from(value: UpdateCandidatePayload) -> Self {
        Self {
            first_name: value.first_name.map(|s| s.trim().to_string()),
            last_name: value.last_name.map(|s| s.trim().to_string()),
            email: value.email.map(|s| s.trim().to_string()),
            phone: value.phone.map(|s| s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: uuid::Uuid,
    pub vacancy_id: uuid::Uuid,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub cv_url: Option<String>,
    pub cv_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateResponse {
    fn from(value: Candidate) -> Self {
        Self {
            id: value.id,
            vacancy_id: value.vacancy_id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            cv_url: value.cv_url,
            cv_summary: value.cv_summary,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CvSummaryQuery {
    /// Regenerate even when a summary is cached.
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSummaryResponse {
    pub cv_summary: String,
    pub cached: bool,
}

/// Text fields of the candidate upload form.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateCandidateForm {
    #[validate(length(min = 1, max = 120))]
    pub first_name: String,
    #[validate(length(min = 1, max = 120))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 40))]
    pub phone: String,
}
