use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::store::{CandidateChanges, RecruitingStore, VacancyChanges, VacancyFilter};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::interview::InterviewTurn;
use crate::models::vacancy::{Vacancy, VacancyStatus};

const VACANCY_COLUMNS: &str =
    "id, title, description, status, candidate_count, created_at, updated_at";

const CANDIDATE_COLUMNS: &str = "id, vacancy_id, first_name, last_name, email, phone, cv_url, cv_path, cv_summary, created_at, updated_at";

#[derive(Debug, FromRow)]
struct VacancyRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    candidate_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VacancyRow> for Vacancy {
    type Error = Error;

    fn try_from(row: VacancyRow) -> Result<Self> {
        let status = row
            .status
            .parse::<VacancyStatus>()
            .map_err(|e| Error::Internal(format!("vacancy {}: {}", row.id, e)))?;
        Ok(Vacancy {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            candidate_count: row.candidate_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecruitingStore for PgStore {
    async fn insert_vacancy(&self, vacancy: &Vacancy) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vacancies (id, title, description, status, candidate_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(vacancy.id)
        .bind(&vacancy.title)
        .bind(&vacancy.description)
        .bind(vacancy.status.as_str())
        .bind(vacancy.candidate_count)
        .bind(vacancy.created_at)
        .bind(vacancy.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_vacancy(&self, id: Uuid) -> Result<Option<Vacancy>> {
        let query = format!("SELECT {} FROM vacancies WHERE id = $1", VACANCY_COLUMNS);
        let row = sqlx::query_as::<_, VacancyRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Vacancy::try_from).transpose()
    }

    async fn list_vacancies(&self, filter: &VacancyFilter) -> Result<(Vec<Vacancy>, i64)> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push(format!("status = ${}", args.len() + 1));
            args.push(status.as_str().to_string());
        }
        if let Some(search) = filter.search.as_deref() {
            let idx = args.len() + 1;
            filters.push(format!(
                "(title ILIKE ${0} ESCAPE '\\' OR description ILIKE ${0} ESCAPE '\\')",
                idx
            ));
            args.push(format!("%{}%", escape_like(search)));
        }

        let where_clause = if filters.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT {} FROM vacancies {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            VACANCY_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM vacancies {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, VacancyRow>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let rows = items_statement
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(Vacancy::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn update_vacancy(&self, id: Uuid, changes: &VacancyChanges) -> Result<Option<Vacancy>> {
        let query = format!(
            r#"
            UPDATE vacancies
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VACANCY_COLUMNS
        );
        let row = sqlx::query_as::<_, VacancyRow>(&query)
            .bind(id)
            .bind(changes.title.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Vacancy::try_from).transpose()
    }

    async fn delete_vacancy(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            "UPDATE vacancies SET candidate_count = candidate_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(candidate.vacancy_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(Error::NotFound("Vacancy not found".into()));
        }

        sqlx::query(
            r#"
            INSERT INTO candidates (
                id, vacancy_id, first_name, last_name, email, phone,
                cv_url, cv_path, cv_summary, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.vacancy_id)
        .bind(&candidate.first_name)
        .bind(&candidate.last_name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.cv_url)
        .bind(&candidate.cv_path)
        .bind(&candidate.cv_summary)
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>> {
        let query = format!(
            "SELECT {} FROM candidates WHERE vacancy_id = $1 AND id = $2",
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(vacancy_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn list_candidates(&self, vacancy_id: Uuid) -> Result<Vec<Candidate>> {
        let query = format!(
            "SELECT {} FROM candidates WHERE vacancy_id = $1 ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        );
        let candidates = sqlx::query_as::<_, Candidate>(&query)
            .bind(vacancy_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    async fn update_candidate(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>> {
        let query = format!(
            r#"
            UPDATE candidates
            SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                updated_at = NOW()
            WHERE vacancy_id = $1 AND id = $2
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(vacancy_id)
            .bind(id)
            .bind(changes.first_name.as_deref())
            .bind(changes.last_name.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.phone.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn set_candidate_cv(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        cv_url: &str,
        cv_path: &str,
    ) -> Result<Option<Candidate>> {
        let query = format!(
            r#"
            UPDATE candidates
            SET cv_url = $3, cv_path = $4, cv_summary = NULL, updated_at = NOW()
            WHERE vacancy_id = $1 AND id = $2
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(vacancy_id)
            .bind(id)
            .bind(cv_url)
            .bind(cv_path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn set_cv_summary(&self, vacancy_id: Uuid, id: Uuid, summary: &str) -> Result<()> {
        let res = sqlx::query(
            "UPDATE candidates SET cv_summary = $3, updated_at = NOW() WHERE vacancy_id = $1 AND id = $2",
        )
        .bind(vacancy_id)
        .bind(id)
        .bind(summary)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Candidate not found".into()));
        }
        Ok(())
    }

    async fn delete_candidate(&self, vacancy_id: Uuid, id: Uuid) -> Result<Option<Candidate>> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "DELETE FROM candidates WHERE vacancy_id = $1 AND id = $2 RETURNING {}",
            CANDIDATE_COLUMNS
        );
        let deleted = sqlx::query_as::<_, Candidate>(&query)
            .bind(vacancy_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if deleted.is_some() {
            sqlx::query(
                "UPDATE vacancies SET candidate_count = GREATEST(candidate_count - 1, 0), updated_at = NOW() WHERE id = $1",
            )
            .bind(vacancy_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn upsert_turn(&self, candidate_id: Uuid, turn: &InterviewTurn) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interviews (candidate_id, seq, question, response)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (candidate_id, seq)
            DO UPDATE SET question = EXCLUDED.question, response = EXCLUDED.response
            "#,
        )
        .bind(candidate_id)
        .bind(turn.id)
        .bind(&turn.question)
        .bind(&turn.response)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_turns(&self, candidate_id: Uuid, turns: &[InterviewTurn]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM interviews WHERE candidate_id = $1")
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;

        for turn in turns {
            sqlx::query(
                "INSERT INTO interviews (candidate_id, seq, question, response) VALUES ($1, $2, $3, $4)",
            )
            .bind(candidate_id)
            .bind(turn.id)
            .bind(&turn.question)
            .bind(&turn.response)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_turns(&self, candidate_id: Uuid) -> Result<Vec<InterviewTurn>> {
        let turns = sqlx::query_as::<_, InterviewTurn>(
            "SELECT seq, question, response FROM interviews WHERE candidate_id = $1 ORDER BY seq",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(turns)
    }
}

/// Escapes LIKE metacharacters so `search` matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
