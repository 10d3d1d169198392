use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacancyStatus {
    #[serde(rename = "Abierta")]
    Open,
    #[serde(rename = "Cerrada")]
    Closed,
}

impl VacancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacancyStatus::Open => "Abierta",
            VacancyStatus::Closed => "Cerrada",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            VacancyStatus::Open => VacancyStatus::Closed,
            VacancyStatus::Closed => VacancyStatus::Open,
        }
    }
}

impl fmt::Display for VacancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VacancyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Abierta" => Ok(VacancyStatus::Open),
            "Cerrada" => Ok(VacancyStatus::Closed),
            other => Err(format!("unknown vacancy status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: VacancyStatus,
    pub candidate_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacancy {
    /// A freshly opened vacancy with no candidates.
    pub fn open(title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: VacancyStatus::Open,
            candidate_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
