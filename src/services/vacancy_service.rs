use std::sync::Arc;
use uuid::Uuid;

use crate::database::{RecruitingStore, VacancyChanges, VacancyFilter};
use crate::dto::vacancy_dto::{CreateVacancyPayload, UpdateVacancyPayload, VacancyListQuery};
use crate::error::{Error, Result};
use crate::models::vacancy::Vacancy;
use crate::services::storage_service::BlobStore;

#[derive(Clone)]
pub struct VacancyService {
    store: Arc<dyn RecruitingStore>,
    blobs: Arc<dyn BlobStore>,
}

pub struct VacancyList {
    pub items: Vec<Vacancy>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

fn required_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::BadRequest("El nombre del puesto es obligatorio.".into()));
    }
    Ok(title.to_string())
}

impl VacancyService {
    pub fn new(store: Arc<dyn RecruitingStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub async fn create(&self, payload: CreateVacancyPayload) -> Result<Vacancy> {
        let title = required_title(&payload.title)?;
        let description = payload.description.unwrap_or_default().trim().to_string();

        let vacancy = Vacancy::open(title, description);
        self.store.insert_vacancy(&vacancy).await?;
        tracing::info!(vacancy_id = %vacancy.id, title = %vacancy.title, "vacancy created");
        Ok(vacancy)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vacancy> {
        self.store
            .get_vacancy(id)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))
    }

    pub async fn list(&self, query: VacancyListQuery) -> Result<VacancyList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let filter = VacancyFilter {
            status: query.status,
            search,
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page),
        };
        let (items, total) = self.store.list_vacancies(&filter).await?;
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(VacancyList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateVacancyPayload) -> Result<Vacancy> {
        let changes = VacancyChanges {
            title: payload.title.as_deref().map(required_title).transpose()?,
            description: payload.description.map(|d| d.trim().to_string()),
            status: payload.status,
        };
        let vacancy = self
            .store
            .update_vacancy(id, &changes)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))?;
        tracing::info!(vacancy_id = %id, status = %vacancy.status, "vacancy updated");
        Ok(vacancy)
    }

    /// Flips Abierta/Cerrada based on the currently stored status.
    pub async fn toggle_status(&self, id: Uuid) -> Result<Vacancy> {
        let current = self.get_by_id(id).await?;
        let changes = VacancyChanges {
            status: Some(current.status.toggled()),
            ..Default::default()
        };
        let vacancy = self
            .store
            .update_vacancy(id, &changes)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))?;
        tracing::info!(vacancy_id = %id, from = %current.status, to = %vacancy.status, "vacancy status toggled");
        Ok(vacancy)
    }

    /// Deletes the vacancy with its candidates; CV blobs are removed best-effort.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let candidates = self.store.list_candidates(id).await?;
        if !self.store.delete_vacancy(id).await? {
            return Err(Error::NotFound("Vacancy not found".into()));
        }

        for candidate in candidates {
            if let Some(path) = candidate.cv_path.as_deref() {
                if let Err(e) = self.blobs.delete(path).await {
                    tracing::warn!(vacancy_id = %id, path, error = %e, "failed to remove CV blob");
                }
            }
        }
        tracing::info!(vacancy_id = %id, "vacancy deleted");
        Ok(())
    }
}
