use movecheck_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `video_type` value for the reference recording.
pub const VIDEO_TYPE_REFERENCE: &str = "reference";

/// `video_type` value for the user's own recording.
pub const VIDEO_TYPE_USER: &str = "user";

/// A row from the `video_uploads` table. `file_path` is relative to the
/// media storage root or bucket.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct VideoUpload {
    pub id: EntityId,
    pub user_id: EntityId,
    pub exercise_type_id: i32,
    pub video_type: String,
    pub file_path: String,
    pub file_size_bytes: Option<i64>,
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub uploaded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for registering an uploaded video.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoUpload {
    pub user_id: EntityId,
    pub exercise_type_id: i32,
    pub video_type: String,
    pub file_path: String,
    pub file_size_bytes: Option<i64>,
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
