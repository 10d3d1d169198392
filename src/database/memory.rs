use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{CandidateChanges, RecruitingStore, VacancyChanges, VacancyFilter};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::interview::InterviewTurn;
use crate::models::vacancy::Vacancy;

#[derive(Default)]
struct Collections {
    vacancies: HashMap<Uuid, Vacancy>,
    candidates: HashMap<Uuid, Candidate>,
    interviews: HashMap<Uuid, BTreeMap<i32, InterviewTurn>>,
}

/// In-process store with the same semantics as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(vacancy: &Vacancy, filter: &VacancyFilter) -> bool {
    if let Some(status) = filter.status {
        if vacancy.status != status {
            return false;
        }
    }
    if let Some(search) = filter.search.as_deref() {
        let needle = search.to_lowercase();
        if !vacancy.title.to_lowercase().contains(&needle)
            && !vacancy.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl RecruitingStore for MemoryStore {
    async fn insert_vacancy(&self, vacancy: &Vacancy) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.vacancies.insert(vacancy.id, vacancy.clone());
        Ok(())
    }

    async fn get_vacancy(&self, id: Uuid) -> Result<Option<Vacancy>> {
        Ok(self.inner.read().await.vacancies.get(&id).cloned())
    }

    async fn list_vacancies(&self, filter: &VacancyFilter) -> Result<(Vec<Vacancy>, i64)> {
        let guard = self.inner.read().await;
        let mut items: Vec<Vacancy> = guard
            .vacancies
            .values()
            .filter(|v| matches(v, filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_vacancy(&self, id: Uuid, changes: &VacancyChanges) -> Result<Option<Vacancy>> {
        let mut guard = self.inner.write().await;
        let Some(vacancy) = guard.vacancies.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            vacancy.title = title.clone();
        }
        if let Some(description) = &changes.description {
            vacancy.description = description.clone();
        }
        if let Some(status) = changes.status {
            vacancy.status = status;
        }
        vacancy.updated_at = Utc::now();
        Ok(Some(vacancy.clone()))
    }

    async fn delete_vacancy(&self, id: Uuid) -> Result<bool> {
        let mut guard = self.inner.write().await;
        if guard.vacancies.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<Uuid> = guard
            .candidates
            .values()
            .filter(|c| c.vacancy_id == id)
            .map(|c| c.id)
            .collect();
        for candidate_id in owned {
            guard.candidates.remove(&candidate_id);
            guard.interviews.remove(&candidate_id);
        }
        Ok(true)
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        let mut guard = self.inner.write().await;
        let vacancy = guard
            .vacancies
            .get_mut(&candidate.vacancy_id)
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))?;
        vacancy.candidate_count += 1;
        vacancy.updated_at = Utc::now();
        guard.candidates.insert(candidate.id, candidate.clone());
        Ok(())
    }

    async fn get_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>> {
        let guard = self.inner.read().await;
        Ok(guard
            .candidates
            .get(&id)
            .filter(|c| c.vacancy_id == vacancy_id)
            .cloned())
    }

    async fn list_candidates(&self, vacancy_id: Uuid) -> Result<Vec<Candidate>> {
        let guard = self.inner.read().await;
        let mut candidates: Vec<Candidate> = guard
            .candidates
            .values()
            .filter(|c| c.vacancy_id == vacancy_id)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(candidates)
    }

    async fn update_candidate(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>> {
        let mut guard = self.inner.write().await;
        let Some(candidate) = guard
            .candidates
            .get_mut(&id)
            .filter(|c| c.vacancy_id == vacancy_id)
        else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            candidate.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            candidate.last_name = last_name.clone();
        }
        if let Some(email) = &changes.email {
            candidate.email = email.clone();
        }
        if let Some(phone) = &changes.phone {
            candidate.phone = phone.clone();
        }
        candidate.updated_at = Utc::now();
        Ok(Some(candidate.clone()))
    }

    async fn set_candidate_cv(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        cv_url: &str,
        cv_path: &str,
    ) -> Result<Option<Candidate>> {
        let mut guard = self.inner.write().await;
        let Some(candidate) = guard
            .candidates
            .get_mut(&id)
            .filter(|c| c.vacancy_id == vacancy_id)
        else {
            return Ok(None);
        };
        candidate.cv_url = Some(cv_url.to_string());
        candidate.cv_path = Some(cv_path.to_string());
        candidate.cv_summary = None;
        candidate.updated_at = Utc::now();
        Ok(Some(candidate.clone()))
    }

    async fn set_cv_summary(&self, vacancy_id: Uuid, id: Uuid, summary: &str) -> Result<()> {
        let mut guard = self.inner.write().await;
        let candidate = guard
            .candidates
            .get_mut(&id)
            .filter(|c| c.vacancy_id == vacancy_id)
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        candidate.cv_summary = Some(summary.to_string());
        candidate.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>> {
        let mut guard = self.inner.write().await;
        let owned = guard
            .candidates
            .get(&id)
            .is_some_and(|c| c.vacancy_id == vacancy_id);
        if !owned {
            return Ok(None);
        }
        let removed = guard.candidates.remove(&id);
        guard.interviews.remove(&id);
        if let Some(vacancy) = guard.vacancies.get_mut(&vacancy_id) {
            vacancy.candidate_count = (vacancy.candidate_count - 1).max(0);
            vacancy.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn upsert_turn(&self, candidate_id: Uuid, turn: &InterviewTurn) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard
            .interviews
            .entry(candidate_id)
            .or_default()
            .insert(turn.id, turn.clone());
        Ok(())
    }

    async fn replace_turns(&self, candidate_id: Uuid, turns: &[InterviewTurn]) -> Result<()> {
        let mut guard = self.inner.write().await;
        let stored = turns.iter().map(|t| (t.id, t.clone())).collect();
        guard.interviews.insert(candidate_id, stored);
        Ok(())
    }

    async fn list_turns(&self, candidate_id: Uuid) -> Result<Vec<InterviewTurn>> {
        let guard = self.inner.read().await;
        Ok(guard
            .interviews
            .get(&candidate_id)
            .map(|turns| turns.values().cloned().collect())
            .unwrap_or_default())
    }
}
