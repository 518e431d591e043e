//! Persistence port for tasks, results and video metadata.

use async_trait::async_trait;
use movecheck_core::types::EntityId;
use movecheck_db::models::analysis_result::{AnalysisResultRecord, NewAnalysisResult};
use movecheck_db::models::analysis_task::{AnalysisTask, CreateAnalysisTask, TaskTransition};
use movecheck_db::models::video_upload::VideoUpload;
use movecheck_db::repositories::{AnalysisResultRepo, AnalysisTaskRepo, VideoUploadRepo};
use movecheck_db::DbPool;

/// Errors from a storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Everything the analysis lifecycle and the HTTP layer need from storage.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn create_task(&self, input: &CreateAnalysisTask) -> Result<AnalysisTask, StoreError>;

    async fn find_task(&self, id: EntityId) -> Result<Option<AnalysisTask>, StoreError>;

    /// Apply `transition` if the task is in its source state. Returns
    /// `false` otherwise, including when the task does not exist.
    async fn transition_task(
        &self,
        id: EntityId,
        transition: TaskTransition,
    ) -> Result<bool, StoreError>;

    async fn save_result(&self, input: &NewAnalysisResult) -> Result<EntityId, StoreError>;

    async fn find_result(
        &self,
        task_id: EntityId,
    ) -> Result<Option<AnalysisResultRecord>, StoreError>;

    async fn find_video(&self, video_id: EntityId) -> Result<Option<VideoUpload>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`AnalysisStore`] backed by the `movecheck-db` repositories.
#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: DbPool,
}

impl PgAnalysisStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn create_task(&self, input: &CreateAnalysisTask) -> Result<AnalysisTask, StoreError> {
        Ok(AnalysisTaskRepo::create(&self.pool, input).await?)
    }

    async fn find_task(&self, id: EntityId) -> Result<Option<AnalysisTask>, StoreError> {
        Ok(AnalysisTaskRepo::find_by_id(&self.pool, id).await?)
    }

    async fn transition_task(
        &self,
        id: EntityId,
        transition: TaskTransition,
    ) -> Result<bool, StoreError> {
        Ok(AnalysisTaskRepo::transition(&self.pool, id, &transition).await?)
    }

    async fn save_result(&self, input: &NewAnalysisResult) -> Result<EntityId, StoreError> {
        Ok(AnalysisResultRepo::create(&self.pool, input).await?)
    }

    async fn find_result(
        &self,
        task_id: EntityId,
    ) -> Result<Option<AnalysisResultRecord>, StoreError> {
        Ok(AnalysisResultRepo::find_by_task_id(&self.pool, task_id).await?)
    }

    async fn find_video(&self, video_id: EntityId) -> Result<Option<VideoUpload>, StoreError> {
        Ok(VideoUploadRepo::find_by_id(&self.pool, video_id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(movecheck_db::health_check(&self.pool).await?)
    }
}
