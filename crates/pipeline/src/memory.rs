//! In-process [`AnalysisStore`] for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use movecheck_core::task_status::TaskStatus;
use movecheck_core::types::EntityId;
use movecheck_db::models::analysis_result::{AnalysisResultRecord, NewAnalysisResult};
use movecheck_db::models::analysis_task::{AnalysisTask, CreateAnalysisTask, TaskTransition};
use movecheck_db::models::video_upload::{CreateVideoUpload, VideoUpload};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{AnalysisStore, StoreError};

/// Holds everything in maps behind async read-write locks. Nothing survives
/// a restart.
#[derive(Default)]
pub struct InMemoryAnalysisStore {
    tasks: RwLock<HashMap<EntityId, AnalysisTask>>,
    results: RwLock<HashMap<EntityId, AnalysisResultRecord>>,
    videos: RwLock<HashMap<EntityId, VideoUpload>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a video record, as an upload flow would.
    pub async fn insert_video(&self, input: CreateVideoUpload) -> VideoUpload {
        let now = Utc::now();
        let video = VideoUpload {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            exercise_type_id: input.exercise_type_id,
            video_type: input.video_type,
            file_path: input.file_path,
            file_size_bytes: input.file_size_bytes,
            duration_seconds: input.duration_seconds,
            width: input.width,
            height: input.height,
            uploaded_at: now,
            created_at: now,
        };
        self.videos.write().await.insert(video.id, video.clone());
        video
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn create_task(&self, input: &CreateAnalysisTask) -> Result<AnalysisTask, StoreError> {
        let now = Utc::now();
        let task = AnalysisTask {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            reference_video_id: input.reference_video_id,
            user_video_id: input.user_video_id,
            exercise_type_id: input.exercise_type_id,
            status_id: TaskStatus::Pending.id(),
            error_message: None,
            processing_started_at: None,
            processing_completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: EntityId) -> Result<Option<AnalysisTask>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn transition_task(
        &self,
        id: EntityId,
        transition: TaskTransition,
    ) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(&id) else {
            return Ok(false);
        };
        if task.status_id != transition.source().id() {
            return Ok(false);
        }

        let now = Utc::now();
        task.status_id = transition.target().id();
        task.updated_at = now;
        match transition {
            TaskTransition::Start => task.processing_started_at = Some(now),
            TaskTransition::Complete => task.processing_completed_at = Some(now),
            TaskTransition::Fail { error_message } => {
                task.processing_completed_at = Some(now);
                task.error_message = Some(error_message);
            }
        }
        Ok(true)
    }

    async fn save_result(&self, input: &NewAnalysisResult) -> Result<EntityId, StoreError> {
        let mut results = self.results.write().await;
        if results.contains_key(&input.task_id) {
            return Err(StoreError::Conflict(format!(
                "Task {} already has a result",
                input.task_id
            )));
        }
        let record = AnalysisResultRecord {
            id: Uuid::now_v7(),
            task_id: input.task_id,
            comparison_result: input.comparison_result.clone(),
            skeleton_data: input.skeleton_data.clone(),
            overall_score: input.overall_score,
            overall_grade: input.overall_grade.clone(),
            created_at: Utc::now(),
        };
        let id = record.id;
        results.insert(record.task_id, record);
        Ok(id)
    }

    async fn find_result(
        &self,
        task_id: EntityId,
    ) -> Result<Option<AnalysisResultRecord>, StoreError> {
        Ok(self.results.read().await.get(&task_id).cloned())
    }

    async fn find_video(&self, video_id: EntityId) -> Result<Option<VideoUpload>, StoreError> {
        Ok(self.videos.read().await.get(&video_id).cloned())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
