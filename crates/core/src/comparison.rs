//! Comparative scoring: runs every dimension scorer over a reference cycle
//! and a user cycle and folds the verdicts into an overall score.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::landmarks::FrameRecord;
use crate::scoring::{
    DepthScorer, Dimension, DimensionResult, DimensionScorer, DimensionStatus,
    LateralTrackingScorer, SymmetryScorer, TrunkLeanScorer,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Points awarded per dimension status.
pub const PASS_POINTS: u32 = 100;
pub const WARN_POINTS: u32 = 60;
pub const FAIL_POINTS: u32 = 30;

/// Minimum overall score for each grade.
pub const EXCELLENT_MIN_SCORE: u8 = 85;
pub const GOOD_MIN_SCORE: u8 = 70;
pub const NEEDS_IMPROVEMENT_MIN_SCORE: u8 = 50;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Verdicts for all four dimensions of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub depth: DimensionResult,
    pub lateral_tracking: DimensionResult,
    pub trunk_lean: DimensionResult,
    pub symmetry: DimensionResult,
}

impl ComparisonResult {
    /// Statuses in fixed dimension order: depth, lateral tracking, trunk
    /// lean, symmetry.
    pub fn statuses(&self) -> [DimensionStatus; 4] {
        [
            self.depth.status,
            self.lateral_tracking.status,
            self.trunk_lean.status,
            self.symmetry.status,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> &DimensionResult {
        match dimension {
            Dimension::Depth => &self.depth,
            Dimension::LateralTracking => &self.lateral_tracking,
            Dimension::TrunkLean => &self.trunk_lean,
            Dimension::Symmetry => &self.symmetry,
        }
    }
}

/// Overall grade band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        if score >= EXCELLENT_MIN_SCORE {
            Self::Excellent
        } else if score >= GOOD_MIN_SCORE {
            Self::Good
        } else if score >= NEEDS_IMPROVEMENT_MIN_SCORE {
            Self::NeedsImprovement
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs_improvement",
            Self::Poor => "poor",
        }
    }
}

/// Aggregate 0-100 score and grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: u8,
    pub grade: Grade,
}

impl OverallScore {
    pub fn from_result(result: &ComparisonResult) -> Self {
        Self::from_statuses(&result.statuses())
    }

    /// Integer mean (rounded down) of the per-status points. An empty slice
    /// scores zero.
    pub fn from_statuses(statuses: &[DimensionStatus]) -> Self {
        let score = if statuses.is_empty() {
            0
        } else {
            let total: u32 = statuses.iter().map(|s| status_points(*s)).sum();
            // Mean of values in 30..=100 always fits in u8.
            (total / statuses.len() as u32) as u8
        };
        Self {
            score,
            grade: Grade::from_score(score),
        }
    }
}

fn status_points(status: DimensionStatus) -> u32 {
    match status {
        DimensionStatus::Pass => PASS_POINTS,
        DimensionStatus::Warn => WARN_POINTS,
        DimensionStatus::Fail => FAIL_POINTS,
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs one scorer per dimension. Stateless; construct once and share.
pub struct ComparisonEngine {
    depth: Box<dyn DimensionScorer>,
    lateral_tracking: Box<dyn DimensionScorer>,
    trunk_lean: Box<dyn DimensionScorer>,
    symmetry: Box<dyn DimensionScorer>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self {
            depth: Box::new(DepthScorer),
            lateral_tracking: Box::new(LateralTrackingScorer),
            trunk_lean: Box::new(TrunkLeanScorer),
            symmetry: Box::new(SymmetryScorer),
        }
    }
}

impl std::fmt::Debug for ComparisonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonEngine")
            .field("depth", &self.depth.dimension())
            .field("lateral_tracking", &self.lateral_tracking.dimension())
            .field("trunk_lean", &self.trunk_lean.dimension())
            .field("symmetry", &self.symmetry.dimension())
            .finish()
    }
}

impl ComparisonEngine {
    /// Replace the default scorers. Each scorer must report the dimension of
    /// the slot it is placed in.
    pub fn with_scorers(
        depth: Box<dyn DimensionScorer>,
        lateral_tracking: Box<dyn DimensionScorer>,
        trunk_lean: Box<dyn DimensionScorer>,
        symmetry: Box<dyn DimensionScorer>,
    ) -> Result<Self, CoreError> {
        let slots = [
            (Dimension::Depth, &depth),
            (Dimension::LateralTracking, &lateral_tracking),
            (Dimension::TrunkLean, &trunk_lean),
            (Dimension::Symmetry, &symmetry),
        ];
        for (expected, scorer) in slots {
            if scorer.dimension() != expected {
                return Err(CoreError::Validation(format!(
                    "Scorer for {} placed in the {} slot",
                    scorer.dimension().as_str(),
                    expected.as_str()
                )));
            }
        }
        Ok(Self {
            depth,
            lateral_tracking,
            trunk_lean,
            symmetry,
        })
    }

    /// Score the user cycle against the reference cycle on every dimension.
    pub fn compare(
        &self,
        reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<ComparisonResult, CoreError> {
        let result = ComparisonResult {
            depth: self.depth.score(reference, user)?,
            lateral_tracking: self.lateral_tracking.score(reference, user)?,
            trunk_lean: self.trunk_lean.score(reference, user)?,
            symmetry: self.symmetry.score(reference, user)?,
        };

        tracing::debug!(
            reference_frames = reference.len(),
            user_frames = user.len(),
            depth = result.depth.status.as_str(),
            lateral_tracking = result.lateral_tracking.status.as_str(),
            trunk_lean = result.trunk_lean.status.as_str(),
            symmetry = result.symmetry.status.as_str(),
            "Compared cycles",
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::scoring::tests::frame_with_hips;

    use DimensionStatus::{Fail, Pass, Warn};

    // -- OverallScore ---------------------------------------------------------

    #[test]
    fn all_pass_is_excellent() {
        let overall = OverallScore::from_statuses(&[Pass; 4]);
        assert_eq!(overall.score, 100);
        assert_eq!(overall.grade, Grade::Excellent);
    }

    #[test]
    fn all_fail_is_poor() {
        let overall = OverallScore::from_statuses(&[Fail; 4]);
        assert_eq!(overall.score, 30);
        assert_eq!(overall.grade, Grade::Poor);
    }

    #[test]
    fn all_warn_is_needs_improvement() {
        let overall = OverallScore::from_statuses(&[Warn; 4]);
        assert_eq!(overall.score, 60);
        assert_eq!(overall.grade, Grade::NeedsImprovement);
    }

    #[test]
    fn mixed_score_is_floored() {
        // (100 + 100 + 60 + 30) / 4 = 72.5
        let overall = OverallScore::from_statuses(&[Pass, Pass, Warn, Fail]);
        assert_eq!(overall.score, 72);
        assert_eq!(overall.grade, Grade::Good);
    }

    #[test]
    fn three_pass_one_warn_is_excellent() {
        // (300 + 60) / 4 = 90
        let overall = OverallScore::from_statuses(&[Pass, Pass, Pass, Warn]);
        assert_eq!(overall.score, 90);
        assert_eq!(overall.grade, Grade::Excellent);
    }

    #[test]
    fn grade_edges() {
        assert_eq!(Grade::from_score(85), Grade::Excellent);
        assert_eq!(Grade::from_score(84), Grade::Good);
        assert_eq!(Grade::from_score(70), Grade::Good);
        assert_eq!(Grade::from_score(69), Grade::NeedsImprovement);
        assert_eq!(Grade::from_score(50), Grade::NeedsImprovement);
        assert_eq!(Grade::from_score(49), Grade::Poor);
    }

    #[test]
    fn grade_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Grade::NeedsImprovement).unwrap(),
            "needs_improvement"
        );
    }

    // -- ComparisonEngine -----------------------------------------------------

    fn cycle() -> Vec<FrameRecord> {
        (0..20)
            .map(|i| frame_with_hips(i, 0.4 + 0.01 * f64::from(i.min(20 - i))))
            .collect()
    }

    #[test]
    fn identical_cycles_all_pass() {
        let frames = cycle();
        let result = ComparisonEngine::default().compare(&frames, &frames).unwrap();
        assert_eq!(result.statuses(), [Pass; 4]);
        assert_eq!(OverallScore::from_result(&result).score, 100);
    }

    #[test]
    fn empty_cycle_is_a_validation_error() {
        assert_matches!(
            ComparisonEngine::default().compare(&[], &cycle()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn with_scorers_rejects_misplaced_scorer() {
        let result = ComparisonEngine::with_scorers(
            Box::new(SymmetryScorer),
            Box::new(LateralTrackingScorer),
            Box::new(TrunkLeanScorer),
            Box::new(SymmetryScorer),
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    struct AlwaysFail(Dimension);

    impl DimensionScorer for AlwaysFail {
        fn dimension(&self) -> Dimension {
            self.0
        }

        fn score(
            &self,
            _reference: &[FrameRecord],
            _user: &[FrameRecord],
        ) -> Result<DimensionResult, CoreError> {
            Ok(DimensionResult {
                status: Fail,
                reference_value: None,
                user_value: None,
                message: "always fails".into(),
                suggestion: String::new(),
            })
        }
    }

    #[test]
    fn replaced_scorer_is_used() {
        let engine = ComparisonEngine::with_scorers(
            Box::new(DepthScorer),
            Box::new(LateralTrackingScorer),
            Box::new(AlwaysFail(Dimension::TrunkLean)),
            Box::new(SymmetryScorer),
        )
        .unwrap();
        let frames = cycle();
        let result = engine.compare(&frames, &frames).unwrap();
        assert_eq!(result.statuses(), [Pass, Pass, Fail, Pass]);
        assert_eq!(result.get(Dimension::TrunkLean).message, "always fails");
    }
}
