//! Video byte retrieval from a local directory or an object-storage bucket.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// Errors from a media adapter.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Source of raw video bytes, addressed by a stored `file_path`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn fetch_bytes(&self, storage_path: &str) -> Result<Vec<u8>, MediaError>;
}

/// Reject absolute paths and any component that could leave the root.
fn check_relative(storage_path: &str) -> Result<&Path, MediaError> {
    let path = Path::new(storage_path);
    let all_normal = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if storage_path.is_empty() || !all_normal {
        return Err(MediaError::InvalidPath(storage_path.to_string()));
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Local filesystem
// ---------------------------------------------------------------------------

/// Reads videos from files under `root`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn fetch_bytes(&self, storage_path: &str) -> Result<Vec<u8>, MediaError> {
        let full_path = self.root.join(check_relative(storage_path)?);
        match tokio::fs::read(&full_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(storage_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP object storage
// ---------------------------------------------------------------------------

/// Default bucket holding uploaded analysis videos.
pub const DEFAULT_BUCKET: &str = "analysis-videos";

/// Downloads objects via `GET {base_url}/storage/v1/object/{bucket}/{path}`
/// with a bearer token.
pub struct HttpMediaStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpMediaStore {
    pub fn new(base_url: String, bucket: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, bucket, api_key)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        bucket: String,
        api_key: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            api_key,
        }
    }

    fn object_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, storage_path
        )
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn fetch_bytes(&self, storage_path: &str) -> Result<Vec<u8>, MediaError> {
        check_relative(storage_path)?;

        let response = self
            .client
            .get(self.object_url(storage_path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MediaError::NotFound(storage_path.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MediaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(storage_path, bytes = bytes.len(), "Downloaded video");
        Ok(bytes.to_vec())
    }
}
