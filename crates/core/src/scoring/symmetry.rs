//! Left-right symmetry of the user's deepest frame.
//!
//! Only the user cycle is measured; the reference value is reported as the
//! ideal of perfect symmetry.

use super::{
    require_deepest, require_point, round_to, Bands, Dimension, DimensionResult, DimensionScorer,
    DimensionStatus,
};
use crate::error::CoreError;
use crate::landmarks::{FrameRecord, LEFT_HIP, LEFT_KNEE, RIGHT_HIP, RIGHT_KNEE};

/// Bands on the user's mean hip/knee height asymmetry.
pub const SYMMETRY_BANDS: Bands = Bands {
    pass_below: 0.02,
    warn_below: 0.05,
};

/// Reported reference value: a perfectly level body.
const IDEAL_ASYMMETRY: f64 = 0.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryScorer;

impl SymmetryScorer {
    fn asymmetry(frames: &[FrameRecord]) -> Result<f64, CoreError> {
        let side = "user";
        let frame = require_deepest(frames, side)?;
        let hip_gap = (require_point(frame, LEFT_HIP, side)?.y
            - require_point(frame, RIGHT_HIP, side)?.y)
            .abs();
        let knee_gap = (require_point(frame, LEFT_KNEE, side)?.y
            - require_point(frame, RIGHT_KNEE, side)?.y)
            .abs();
        Ok((hip_gap + knee_gap) / 2.0)
    }
}

impl DimensionScorer for SymmetryScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Symmetry
    }

    fn score(
        &self,
        _reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<DimensionResult, CoreError> {
        let asymmetry = Self::asymmetry(user)?;

        let status = SYMMETRY_BANDS.classify(asymmetry);
        let (message, suggestion) = match status {
            DimensionStatus::Pass => (
                "Left-right balance is good",
                "Keep your weight evenly distributed",
            ),
            DimensionStatus::Warn => (
                "Slight left-right imbalance",
                "Spread your weight evenly across both feet",
            ),
            DimensionStatus::Fail => (
                "Clear left-right imbalance",
                "Check that both feet carry the same load",
            ),
        };

        Ok(DimensionResult {
            status,
            reference_value: Some(IDEAL_ASYMMETRY),
            user_value: Some(round_to(asymmetry, 3)),
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        })
    }
}
