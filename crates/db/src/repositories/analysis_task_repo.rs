//! Repository for the `analysis_tasks` table.
//!
//! Status updates are conditional on the expected current status, so a task
//! can never leave a terminal state and concurrent writers cannot both win.

use movecheck_core::task_status::TaskStatus;
use movecheck_core::types::EntityId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis_task::{AnalysisTask, CreateAnalysisTask, TaskTransition};

/// Column list for `analysis_tasks` queries.
const COLUMNS: &str = "\
    id, user_id, reference_video_id, user_video_id, exercise_type_id, \
    status_id, error_message, processing_started_at, processing_completed_at, \
    created_at, updated_at";

pub struct AnalysisTaskRepo;

impl AnalysisTaskRepo {
    /// Insert a new task in `pending` with a fresh UUIDv7 id.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnalysisTask,
    ) -> Result<AnalysisTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO analysis_tasks \
                 (id, user_id, reference_video_id, user_video_id, exercise_type_id, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisTask>(&query)
            .bind(Uuid::now_v7())
            .bind(input.user_id)
            .bind(input.reference_video_id)
            .bind(input.user_video_id)
            .bind(input.exercise_type_id)
            .bind(TaskStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<AnalysisTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_tasks WHERE id = $1");
        sqlx::query_as::<_, AnalysisTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a lifecycle transition.
    ///
    /// Returns `false` when the task does not exist or is not in the
    /// transition's source state.
    pub async fn transition(
        pool: &PgPool,
        id: EntityId,
        transition: &TaskTransition,
    ) -> Result<bool, sqlx::Error> {
        let stamp = match transition {
            TaskTransition::Start => "processing_started_at",
            TaskTransition::Complete | TaskTransition::Fail { .. } => "processing_completed_at",
        };
        let query = format!(
            "UPDATE analysis_tasks \
             SET status_id = $2, {stamp} = NOW(), \
                 error_message = COALESCE($4, error_message), updated_at = NOW() \
             WHERE id = $1 AND status_id = $3"
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(transition.target().id())
            .bind(transition.source().id())
            .bind(transition.error_message())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
