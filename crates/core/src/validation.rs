//! Input validation for analysis submissions.

use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;
use crate::types::EntityId;

/// A request to compare a user video against a reference video.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalysisRequest {
    pub user_id: EntityId,
    pub reference_video_id: EntityId,
    pub user_video_id: EntityId,
    #[validate(range(min = 1, message = "exercise_type_id must be at least 1"))]
    pub exercise_type_id: i32,
}

impl AnalysisRequest {
    /// Run field validation and cross-field checks, mapping failures to
    /// [`CoreError::Validation`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.reference_video_id == self.user_video_id {
            return Err(CoreError::Validation(
                "reference_video_id and user_video_id must differ".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    const SQUAT: i32 = 1;

    fn request(exercise_type_id: i32) -> AnalysisRequest {
        AnalysisRequest {
            user_id: Uuid::now_v7(),
            reference_video_id: Uuid::now_v7(),
            user_video_id: Uuid::now_v7(),
            exercise_type_id,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request(SQUAT).check().is_ok());
    }

    #[test]
    fn zero_exercise_type_rejected() {
        assert_matches!(
            request(0).check(),
            Err(CoreError::Validation(msg)) if msg.contains("exercise_type_id")
        );
    }

    #[test]
    fn same_video_on_both_sides_rejected() {
        let mut req = request(SQUAT);
        req.user_video_id = req.reference_video_id;
        assert_matches!(req.check(), Err(CoreError::Validation(_)));
    }
}
