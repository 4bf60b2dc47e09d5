//! Blob storage for uploaded images.
//!
//! Files are written before the transaction that references them opens.
//! A failed upload therefore aborts the write with no rows inserted, but
//! files already stored stay on disk when a later step rolls back.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A file received from a client, held in memory until stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }
}

/// Storage backend trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist the upload under `destination` and return its public URL.
    async fn store(&self, upload: &Upload, destination: &str) -> AppResult<String>;
}

/// Writes uploads below a local media root.
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.media_root, config.media_url.clone())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, upload: &Upload, destination: &str) -> AppResult<String> {
        if upload.bytes.is_empty() {
            return Err(AppError::invalid_field("images", "The submitted file is empty."));
        }

        let dir = self.root.join(destination);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::storage(format!("{}: {}", dir.display(), e)))?;

        let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(&upload.file_name));
        let path = dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::storage(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), size = upload.bytes.len(), "Stored upload");
        Ok(format!("{}/{}/{}", self.base_url, destination, name))
    }
}

/// Store every upload in order, stopping at the first failure.
pub async fn store_all(
    store: &dyn BlobStore,
    uploads: &[Upload],
    destination: &str,
) -> AppResult<Vec<String>> {
    let mut urls = Vec::with_capacity(uploads.len());
    for upload in uploads {
        urls.push(store.store(upload, destination).await?);
    }
    Ok(urls)
}

/// Keep the final path component, restricted to a portable character set.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
