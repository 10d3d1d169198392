//! Blob storage for uploaded CVs.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};
use crate::utils::signing;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()>;
    async fn get(&self, path: &str) -> Result<Bytes>;
    async fn delete(&self, path: &str) -> Result<()>;
    async fn exists(&self, path: &str) -> Result<bool>;
    /// A URL that lets anyone holding it download the blob.
    fn download_url(&self, path: &str) -> String;
}

/// Stores blobs on local disk and hands out HMAC-signed `/files/...` URLs.
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    secret: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, secret: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn verify_token(&self, path: &str, token: &str) -> bool {
        signing::verify_path(&self.secret, path, token)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::BadRequest(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &data).await.map_err(|e| {
            tracing::error!(path, error = %e, "failed to write blob");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;
        tracing::debug!(path, content_type, bytes = data.len(), "blob stored");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("File not found".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        Ok(fs::try_exists(&target).await?)
    }

    fn download_url(&self, path: &str) -> String {
        format!(
            "{}/files/{}?token={}",
            self.public_base_url,
            path,
            signing::sign_path(&self.secret, path)
        )
    }
}

/// Blob key for an uploaded CV: `cvs/{vacancy}/{millis}_{file name}`.
pub fn cv_blob_path(vacancy_id: uuid::Uuid, uploaded_at_millis: i64, file_name: &str) -> String {
    let clean: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = if clean.trim_matches('.').is_empty() {
        "cv.pdf".to_string()
    } else {
        clean
    };
    format!("cvs/{}/{}_{}", vacancy_id, uploaded_at_millis, clean)
}
