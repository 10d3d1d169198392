use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::database::{CandidateChanges, RecruitingStore};
use crate::dto::candidate_dto::{CreateCandidateForm, UpdateCandidatePayload};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::services::storage_service::{cv_blob_path, BlobStore};
use crate::utils::time;

/// A CV file as received from the upload form.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub fn validate_pdf(upload: &CvUpload) -> Result<()> {
    if upload.data.is_empty() {
        return Err(Error::BadRequest("El archivo del CV es obligatorio.".into()));
    }
    let declared_pdf = upload
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        || upload.file_name.to_lowercase().ends_with(".pdf");
    if !declared_pdf || !upload.data.starts_with(b"%PDF") {
        return Err(Error::BadRequest(
            "Por favor, selecciona un archivo PDF.".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn RecruitingStore>,
    blobs: Arc<dyn BlobStore>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn RecruitingStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    async fn ensure_vacancy(&self, vacancy_id: Uuid) -> Result<()> {
        self.store
            .get_vacancy(vacancy_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))
    }

    async fn upload_cv(&self, vacancy_id: Uuid, cv: CvUpload) -> Result<(String, String)> {
        validate_pdf(&cv)?;
        let mut millis = time::unix_millis(time::now());
        let mut path = cv_blob_path(vacancy_id, millis, &cv.file_name);
        while self.blobs.exists(&path).await? {
            millis += 1;
            path = cv_blob_path(vacancy_id, millis, &cv.file_name);
        }
        self.blobs.put(&path, cv.data, PDF_CONTENT_TYPE).await?;
        let url = self.blobs.download_url(&path);
        Ok((url, path))
    }

    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.blobs.delete(path).await {
            tracing::warn!(path, error = %e, "failed to remove CV blob");
        }
    }

    pub async fn create(
        &self,
        vacancy_id: Uuid,
        form: CreateCandidateForm,
        cv: CvUpload,
    ) -> Result<Candidate> {
        form.validate()?;
        self.ensure_vacancy(vacancy_id).await?;

        let (cv_url, cv_path) = self.upload_cv(vacancy_id, cv).await?;

        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            vacancy_id,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            cv_url: Some(cv_url),
            cv_path: Some(cv_path.clone()),
            cv_summary: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_candidate(&candidate).await {
            self.discard_blob(&cv_path).await;
            return Err(e);
        }

        tracing::info!(vacancy_id = %vacancy_id, candidate_id = %candidate.id, "candidate created");
        Ok(candidate)
    }

    pub async fn list(&self, vacancy_id: Uuid) -> Result<Vec<Candidate>> {
        self.ensure_vacancy(vacancy_id).await?;
        self.store.list_candidates(vacancy_id).await
    }

    pub async fn get(&self, vacancy_id: Uuid, id: Uuid) -> Result<Candidate> {
        self.store
            .get_candidate(vacancy_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }

    pub async fn update(
        &self,
        vacancy_id: Uuid,
        id: Uuid,
        payload: UpdateCandidatePayload,
    ) -> Result<Candidate> {
        payload.validate()?;
        let changes = CandidateChanges::from(payload);
        if changes.first_name.as_deref().is_some_and(str::is_empty) {
            return Err(Error::BadRequest("El nombre es obligatorio.".into()));
        }
        if changes.last_name.as_deref().is_some_and(str::is_empty) {
            return Err(Error::BadRequest("El apellido es obligatorio.".into()));
        }
        self.store
            .update_candidate(vacancy_id, id, &changes)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }

    /// Uploads a replacement CV; the cached summary is dropped with the old file.
    pub async fn replace_cv(&self, vacancy_id: Uuid, id: Uuid, cv: CvUpload) -> Result<Candidate> {
        let existing = self.get(vacancy_id, id).await?;
        let (cv_url, cv_path) = self.upload_cv(vacancy_id, cv).await?;

        let updated = match self
            .store
            .set_candidate_cv(vacancy_id, id, &cv_url, &cv_path)
            .await
        {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                self.discard_blob(&cv_path).await;
                return Err(Error::NotFound("Candidate not found".into()));
            }
            Err(e) => {
                self.discard_blob(&cv_path).await;
                return Err(e);
            }
        };

        if let Some(old) = existing.cv_path.as_deref() {
            self.discard_blob(old).await;
        }
        tracing::info!(vacancy_id = %vacancy_id, candidate_id = %id, "candidate CV replaced");
        Ok(updated)
    }

    pub async fn delete(&self, vacancy_id: Uuid, id: Uuid) -> Result<Candidate> {
        let removed = self
            .store
            .delete_candidate(vacancy_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        if let Some(path) = removed.cv_path.as_deref() {
            self.discard_blob(path).await;
        }
        tracing::info!(vacancy_id = %vacancy_id, candidate_id = %id, "candidate deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, data: &'static [u8]) -> CvUpload {
        CvUpload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn accepts_pdf_by_type_or_extension() {
        assert!(validate_pdf(&upload("cv.pdf", None, b"%PDF-1.7 ...")).is_ok());
        assert!(validate_pdf(&upload("cv", Some("application/pdf"), b"%PDF-1.4")).is_ok());
    }

    #[test]
    fn rejects_non_pdf_and_empty_files() {
        assert!(validate_pdf(&upload("cv.docx", Some("application/msword"), b"PK\x03\x04")).is_err());
        assert!(validate_pdf(&upload("cv.pdf", Some("application/pdf"), b"not a pdf")).is_err());
        assert!(validate_pdf(&upload("cv.pdf", Some("application/pdf"), b"")).is_err());
    }
}
