//! Knee tracking: horizontal knee-over-ankle offset at the deepest frame.

use super::{
    require_deepest, require_point, round_to, Bands, Dimension, DimensionResult, DimensionScorer,
    DimensionStatus,
};
use crate::error::CoreError;
use crate::landmarks::{FrameRecord, LEFT_ANKLE, LEFT_KNEE};

/// Bands on `|reference - user|` in normalized image width.
pub const LATERAL_TRACKING_BANDS: Bands = Bands {
    pass_below: 0.03,
    warn_below: 0.06,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LateralTrackingScorer;

impl LateralTrackingScorer {
    fn knee_offset(frames: &[FrameRecord], side: &str) -> Result<f64, CoreError> {
        let frame = require_deepest(frames, side)?;
        let knee = require_point(frame, LEFT_KNEE, side)?;
        let ankle = require_point(frame, LEFT_ANKLE, side)?;
        Ok((knee.x - ankle.x).abs())
    }
}

impl DimensionScorer for LateralTrackingScorer {
    fn dimension(&self) -> Dimension {
        Dimension::LateralTracking
    }

    fn score(
        &self,
        reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<DimensionResult, CoreError> {
        let reference_offset = Self::knee_offset(reference, "reference")?;
        let user_offset = Self::knee_offset(user, "user")?;
        let diff = (reference_offset - user_offset).abs();

        let status = LATERAL_TRACKING_BANDS.classify(diff);
        let (message, suggestion) = match status {
            DimensionStatus::Pass => ("Knee tracking is good", "Keep your current knee path"),
            DimensionStatus::Warn => (
                "Knee tracking drifts slightly",
                "Keep your knees pointing the same way as your toes",
            ),
            DimensionStatus::Fail => (
                "Knee tracking drifts noticeably",
                "Push the knees out over the toes and avoid letting them cave in",
            ),
        };

        Ok(DimensionResult {
            status,
            reference_value: Some(round_to(reference_offset, 3)),
            user_value: Some(round_to(user_offset, 3)),
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        })
    }
}
