use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub cv_url: Option<String>,
    /// Blob path behind `cv_url`.
    pub cv_path: Option<String>,
    pub cv_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The cached summary, ignoring blank values.
    pub fn cached_summary(&self) -> Option<&str> {
        self.cv_summary
            .as_deref()
            .filter(|summary| !summary.trim().is_empty())
    }
}
