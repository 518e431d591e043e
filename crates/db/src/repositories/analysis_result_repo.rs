//! Repository for the `analysis_results` table.

use movecheck_core::types::EntityId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis_result::{AnalysisResultRecord, NewAnalysisResult};

/// Column list for `analysis_results` queries.
const COLUMNS: &str = "\
    id, task_id, comparison_result, skeleton_data, overall_score, overall_grade, created_at";

pub struct AnalysisResultRepo;

impl AnalysisResultRepo {
    /// Insert a result and return its id. Fails on a second result for the
    /// same task (unique `task_id`).
    pub async fn create(
        pool: &PgPool,
        input: &NewAnalysisResult,
    ) -> Result<EntityId, sqlx::Error> {
        let row: (EntityId,) = sqlx::query_as(
            "INSERT INTO analysis_results \
                 (id, task_id, comparison_result, skeleton_data, overall_score, overall_grade) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(Uuid::now_v7())
        .bind(input.task_id)
        .bind(&input.comparison_result)
        .bind(&input.skeleton_data)
        .bind(input.overall_score)
        .bind(&input.overall_grade)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: EntityId,
    ) -> Result<Option<AnalysisResultRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_results WHERE task_id = $1");
        sqlx::query_as::<_, AnalysisResultRecord>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }
}
