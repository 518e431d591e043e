//! Trunk lean: hip flexion between torso and thigh at the deepest frame.

use super::{
    require_deepest, require_point, round_to, Bands, Dimension, DimensionResult, DimensionScorer,
    DimensionStatus,
};
use crate::error::CoreError;
use crate::geometry::angle_at;
use crate::landmarks::{FrameRecord, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER};

/// Bands on `|reference - user|` in degrees.
pub const TRUNK_LEAN_BANDS: Bands = Bands {
    pass_below: 10.0,
    warn_below: 20.0,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TrunkLeanScorer;

impl TrunkLeanScorer {
    fn hip_angle(frames: &[FrameRecord], side: &str) -> Result<f64, CoreError> {
        let frame = require_deepest(frames, side)?;
        let shoulder = require_point(frame, LEFT_SHOULDER, side)?;
        let hip = require_point(frame, LEFT_HIP, side)?;
        let knee = require_point(frame, LEFT_KNEE, side)?;
        Ok(angle_at(shoulder, hip, knee))
    }
}

impl DimensionScorer for TrunkLeanScorer {
    fn dimension(&self) -> Dimension {
        Dimension::TrunkLean
    }

    fn score(
        &self,
        reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<DimensionResult, CoreError> {
        let reference_angle = Self::hip_angle(reference, "reference")?;
        let user_angle = Self::hip_angle(user, "user")?;
        let diff = (reference_angle - user_angle).abs();

        let status = TRUNK_LEAN_BANDS.classify(diff);
        let (message, suggestion) = match status {
            DimensionStatus::Pass => ("Upper-body posture is good".to_string(), "Keep your chest up"),
            DimensionStatus::Warn => (
                format!("Upper body leans slightly forward ({diff:.1}° difference)"),
                "Brace your core and avoid leaning too far forward",
            ),
            DimensionStatus::Fail => (
                format!("Upper body leans too far forward ({diff:.1}° difference)"),
                "Strengthen your core and keep the torso upright",
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
