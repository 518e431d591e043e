//! Analysis task rows and lifecycle transitions.

use movecheck_core::task_status::TaskStatus;
use movecheck_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `analysis_tasks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AnalysisTask {
    pub id: EntityId,
    pub user_id: EntityId,
    pub reference_video_id: EntityId,
    pub user_video_id: EntityId,
    pub exercise_type_id: i32,
    pub status_id: i16,
    pub error_message: Option<String>,
    pub processing_started_at: Option<Timestamp>,
    pub processing_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnalysisTask {
    /// Decoded status, `None` if the row carries an unknown id.
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::from_id(self.status_id)
    }
}

/// DTO for creating a new pending task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnalysisTask {
    pub user_id: EntityId,
    pub reference_video_id: EntityId,
    pub user_video_id: EntityId,
    pub exercise_type_id: i32,
}

/// A lifecycle step applied to a stored task.
///
/// Each step only applies when the task is currently in [`source`](Self::source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTransition {
    /// pending -> processing, stamps `processing_started_at`.
    Start,
    /// processing -> completed, stamps `processing_completed_at`.
    Complete,
    /// processing -> failed, stamps `processing_completed_at`.
    Fail { error_message: String },
}

impl TaskTransition {
    pub fn source(&self) -> TaskStatus {
        match self {
            Self::Start => TaskStatus::Pending,
            Self::Complete | Self::Fail { .. } => TaskStatus::Processing,
        }
    }

    pub fn target(&self) -> TaskStatus {
        match self {
            Self::Start => TaskStatus::Processing,
            Self::Complete => TaskStatus::Completed,
            Self::Fail { .. } => TaskStatus::Failed,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail { error_message } => Some(error_message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_the_state_machine() {
        let transitions = [
            TaskTransition::Start,
            TaskTransition::Complete,
            TaskTransition::Fail {
                error_message: "boom".into(),
            },
        ];
        for transition in transitions {
            assert!(
                transition.source().can_transition_to(transition.target()),
                "{transition:?}"
            );
        }
    }

    #[test]
    fn only_fail_carries_a_message() {
        assert_eq!(TaskTransition::Start.error_message(), None);
        assert_eq!(
            TaskTransition::Fail {
                error_message: "no video".into()
            }
            .error_message(),
            Some("no video")
        );
    }
}
