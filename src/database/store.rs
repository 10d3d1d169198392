//! Document-store boundary.
//!
//! Services only talk to [`RecruitingStore`]; `PgStore` backs production and
//! `MemoryStore` backs tests and database-less local runs. Writes are plain
//! last-write-wins: no optimistic locking is performed.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::models::interview::InterviewTurn;
use crate::models::vacancy::{Vacancy, VacancyStatus};

#[derive(Debug, Clone, Default)]
pub struct VacancyFilter {
    pub status: Option<VacancyStatus>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default)]
pub struct VacancyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<VacancyStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[async_trait]
pub trait RecruitingStore: Send + Sync {
    async fn insert_vacancy(&self, vacancy: &Vacancy) -> Result<()>;
    async fn get_vacancy(&self, id: Uuid) -> Result<Option<Vacancy>>;
    /// Matching page ordered by creation time (newest first) plus the total match count.
    async fn list_vacancies(&self, filter: &VacancyFilter) -> Result<(Vec<Vacancy>, i64)>;
    async fn update_vacancy(&self, id: Uuid, changes: &VacancyChanges) -> Result<Option<Vacancy>>;
    /// Removes the vacancy together with its candidates and their interviews.
    async fn delete_vacancy(&self, id: Uuid) -> Result<bool>;

    /// Inserts the candidate and bumps the owning vacancy's candidate count.
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()>;
    async fn get_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>>;
    async fn list_candidates(&self, vacancy_id: Uuid) -> Result<Vec<Candidate>>;
    async fn update_candidate(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>>;
    /// Points the candidate at a new CV and drops the cached summary.
    async fn set_candidate_cv(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        cv_url: &str,
        cv_path: &str,
    ) -> Result<Option<Candidate>>;
    async fn set_cv_summary(&self, vacancy_id: Uuid, id: Uuid, summary: &str) -> Result<()>;
    /// Removes the candidate and its interviews, decrementing the vacancy's count.
    async fn delete_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>>;

    async fn upsert_turn(&self, candidate_id: Uuid, turn: &InterviewTurn) -> Result<()>;
    /// Replaces the stored transcript with `turns`.
    async fn replace_turns(&self, candidate_id: Uuid, turns: &[InterviewTurn]) -> Result<()>;
    async fn list_turns(&self, candidate_id: Uuid) -> Result<Vec<InterviewTurn>>;
}
