//! Repository for the `video_uploads` table.

use movecheck_core::types::EntityId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::video_upload::{CreateVideoUpload, VideoUpload};

/// Column list for `video_uploads` queries.
const COLUMNS: &str = "\
    id, user_id, exercise_type_id, video_type, file_path, file_size_bytes, \
    duration_seconds, width, height, uploaded_at, created_at";

pub struct VideoUploadRepo;

impl VideoUploadRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateVideoUpload,
    ) -> Result<VideoUpload, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_uploads \
                 (id, user_id, exercise_type_id, video_type, file_path, \
                  file_size_bytes, duration_seconds, width, height) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoUpload>(&query)
            .bind(Uuid::now_v7())
            .bind(input.user_id)
            .bind(input.exercise_type_id)
            .bind(&input.video_type)
            .bind(&input.file_path)
            .bind(input.file_size_bytes)
            .bind(input.duration_seconds)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<VideoUpload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_uploads WHERE id = $1");
        sqlx::query_as::<_, VideoUpload>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
