//! Stored comparison outcomes, one per completed task.

use movecheck_core::comparison::{ComparisonResult, OverallScore};
use movecheck_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `analysis_results` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AnalysisResultRecord {
    pub id: EntityId,
    pub task_id: EntityId,
    pub comparison_result: serde_json::Value,
    pub skeleton_data: Option<serde_json::Value>,
    pub overall_score: i16,
    pub overall_grade: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a result.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysisResult {
    pub task_id: EntityId,
    pub comparison_result: serde_json::Value,
    pub skeleton_data: Option<serde_json::Value>,
    pub overall_score: i16,
    pub overall_grade: String,
}

impl NewAnalysisResult {
    pub fn from_comparison(
        task_id: EntityId,
        result: &ComparisonResult,
        overall: &OverallScore,
        skeleton_data: Option<serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            task_id,
            comparison_result: serde_json::to_value(result)?,
            skeleton_data,
            overall_score: i16::from(overall.score),
            overall_grade: overall.grade.as_str().to_string(),
        })
    }
}
