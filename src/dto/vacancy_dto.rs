use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vacancy::{Vacancy, VacancyStatus};
use crate::services::vacancy_service::VacancyList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVacancyPayload {
    #[serde(rename = "puesto")]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVacancyPayload {
    #[serde(rename = "puesto")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "estado")]
    pub status: Option<VacancyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyResponse {
    pub id: uuid::Uuid,
    #[serde(rename = "puesto")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: VacancyStatus,
    #[serde(rename = "candidatos")]
    pub candidate_count: i64,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyListResponse {
    pub items: Vec<VacancyResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VacancyListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(rename = "estado")]
    pub status: Option<VacancyStatus>,
    pub search: Option<String>,
}

impl From<Vacancy> for VacancyResponse {
    fn from(value: Vacancy) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status,
            candidate_count: value.candidate_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<VacancyList> for VacancyListResponse {
    fn from(value: VacancyList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}
