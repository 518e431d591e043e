//! Client for the external pose-estimation service.
//!
//! The service accepts raw video bytes on `POST /extract` and answers with
//! per-frame body landmarks plus basic video metadata.

use std::time::Duration;

use async_trait::async_trait;
use movecheck_core::landmarks::LandmarkSequence;
use serde::Deserialize;

/// Errors from the pose adapter.
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Pose service error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Landmarks extracted from one video.
///
/// `frames` is validated on decode (strictly ascending frame indices, no
/// confidence without landmarks).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoseExtraction {
    pub success: bool,
    #[serde(default)]
    pub frames: LandmarkSequence,
    #[serde(default)]
    pub total_frames: u32,
    #[serde(default)]
    pub video_fps: f64,
    #[serde(default)]
    pub video_width: u32,
    #[serde(default)]
    pub video_height: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// Turns a video into a landmark sequence.
#[async_trait]
pub trait PoseExtractor: Send + Sync {
    async fn extract(&self, video: Vec<u8>) -> Result<PoseExtraction, PoseError>;
}

/// Default request timeout for one extraction. Videos are decoded frame by
/// frame on the service side, so this is generous.
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(300);

/// [`PoseExtractor`] over HTTP.
pub struct HttpPoseExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPoseExtractor {
    /// * `base_url` - Service root, e.g. `http://pose:8001`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PoseError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PoseExtractor for HttpPoseExtractor {
    async fn extract(&self, video: Vec<u8>) -> Result<PoseExtraction, PoseError> {
        let size = video.len();
        let response = self
            .client
            .post(format!("{}/extract", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(video)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PoseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let extraction: PoseExtraction = response.json().await?;
        tracing::debug!(
            bytes = size,
            frames = extraction.frames.len(),
            valid_frames = extraction.frames.valid_frame_count(),
            fps = extraction.video_fps,
            "Pose extraction finished",
        );
        Ok(extraction)
    }
}
