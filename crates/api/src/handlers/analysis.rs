//! Handlers for analysis submission, task polling and result retrieval.
//!
//! Submission only records the task; the comparison itself runs in the
//! background on the [`AnalysisRunner`](movecheck_pipeline::AnalysisRunner).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use movecheck_core::error::CoreError;
use movecheck_core::task_status::TaskStatus;
use movecheck_core::types::{EntityId, Timestamp};
use movecheck_core::validation::AnalysisRequest;
use movecheck_db::models::analysis_result::AnalysisResultRecord;
use movecheck_db::models::analysis_task::{AnalysisTask, CreateAnalysisTask};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub task_id: EntityId,
    pub status: TaskStatus,
    pub message: &'static str,
}

/// Task fields with the status resolved to its name.
#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: EntityId,
    pub status: TaskStatus,
    pub user_id: EntityId,
    pub reference_video_id: EntityId,
    pub user_video_id: EntityId,
    pub exercise_type_id: i32,
    pub error_message: Option<String>,
    pub processing_started_at: Option<Timestamp>,
    pub processing_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TaskStatusResponse {
    fn from_task(task: AnalysisTask, status: TaskStatus) -> Self {
        Self {
            task_id: task.id,
            status,
            user_id: task.user_id,
            reference_video_id: task.reference_video_id,
            user_video_id: task.user_video_id,
            exercise_type_id: task.exercise_type_id,
            error_message: task.error_message,
            processing_started_at: task.processing_started_at,
            processing_completed_at: task.processing_completed_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisResultResponse {
    pub task_id: EntityId,
    pub comparison_result: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skeleton_data: Option<serde_json::Value>,
    pub overall_score: i16,
    pub overall_grade: String,
    pub created_at: Timestamp,
}

impl From<AnalysisResultRecord> for AnalysisResultResponse {
    fn from(record: AnalysisResultRecord) -> Self {
        Self {
            task_id: record.task_id,
            comparison_result: record.comparison_result,
            skeleton_data: record.skeleton_data,
            overall_score: record.overall_score,
            overall_grade: record.overall_grade,
            created_at: record.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a task and resolve its status, or `NotFound`.
async fn find_task(state: &AppState, task_id: EntityId) -> AppResult<(AnalysisTask, TaskStatus)> {
    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AnalysisTask",
            id: task_id,
        }))?;

    let status = task.status().ok_or_else(|| {
        AppError::InternalError(format!(
            "Task {task_id} has unknown status id {}",
            task.status_id
        ))
    })?;

    Ok((task, status))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/analyze
///
/// Record a pending task and dispatch its run. Returns 201 immediately.
pub async fn submit_analysis(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request.check()?;

    let task = state
        .store
        .create_task(&CreateAnalysisTask {
            user_id: request.user_id,
            reference_video_id: request.reference_video_id,
            user_video_id: request.user_video_id,
            exercise_type_id: request.exercise_type_id,
        })
        .await?;

    tracing::info!(
        task_id = %task.id,
        user_id = %task.user_id,
        exercise_type_id = task.exercise_type_id,
        "Analysis task submitted",
    );
    state.runner.spawn(task.id);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitResponse {
                task_id: task.id,
                status: TaskStatus::Pending,
                message: "Task created, processing",
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let (task, status) = find_task(&state, task_id).await?;
    Ok(Json(DataResponse {
        data: TaskStatusResponse::from_task(task, status),
    }))
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// GET /api/v1/results/{task_id}
///
/// Returns 409 while the task is not `completed`.
pub async fn get_result(
    State(state): State<AppState>,
    Path(task_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let (task, status) = find_task(&state, task_id).await?;
    if !status.is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Task {task_id} is not completed yet (status: {status})"
        ))));
    }
    if status == TaskStatus::Failed {
        let reason = task.error_message.as_deref().unwrap_or("unknown error");
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Task {task_id} failed: {reason}"
        ))));
    }

    let record = state
        .store
        .find_result(task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AnalysisResult",
            id: task_id,
        }))?;

    Ok(Json(DataResponse {
        data: AnalysisResultResponse::from(record),
    }))
}
