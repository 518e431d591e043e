//! Squat depth: knee flexion at the deepest frame.
//!
//! Measured as the angle at the left knee between hip and ankle. A smaller
//! angle means a deeper squat.

use super::{
    require_deepest, require_point, round_to, Bands, Dimension, DimensionResult, DimensionScorer,
    DimensionStatus,
};
use crate::error::CoreError;
use crate::geometry::angle_at;
use crate::landmarks::{FrameRecord, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE};

/// Bands on `|reference - user|` in degrees.
pub const DEPTH_BANDS: Bands = Bands {
    pass_below: 10.0,
    warn_below: 20.0,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthScorer;

impl DepthScorer {
    fn knee_angle(frames: &[FrameRecord], side: &str) -> Result<f64, CoreError> {
        let frame = require_deepest(frames, side)?;
        let hip = require_point(frame, LEFT_HIP, side)?;
        let knee = require_point(frame, LEFT_KNEE, side)?;
        let ankle = require_point(frame, LEFT_ANKLE, side)?;
        Ok(angle_at(hip, knee, ankle))
    }
}

impl DimensionScorer for DepthScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Depth
    }

    fn score(
        &self,
        reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<DimensionResult, CoreError> {
        let reference_angle = Self::knee_angle(reference, "reference")?;
        let user_angle = Self::knee_angle(user, "user")?;
        let diff = (reference_angle - user_angle).abs();

        let status = DEPTH_BANDS.classify(diff);
        let (message, suggestion) = match status {
            DimensionStatus::Pass => (
                "Squat depth matches the reference".to_string(),
                "Keep your current depth",
            ),
            DimensionStatus::Warn => (
                format!("Squat depth is slightly shallow ({diff:.1}° difference)"),
                "Try sitting a little deeper, as if onto a chair",
            ),
            DimensionStatus::Fail => (
                format!("Squat depth is insufficient ({diff:.1}° difference)"),
                "Squat noticeably deeper; the hips should drop below the knees",
            ),
        };

        Ok(DimensionResult {
            status,
            reference_value: Some(round_to(reference_angle, 1)),
            user_value: Some(round_to(user_angle, 1)),
            message,
            suggestion: suggestion.to_string(),
        })
    }
}
