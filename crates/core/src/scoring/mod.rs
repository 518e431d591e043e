//! Per-dimension biomechanical scorers.
//!
//! Each scorer compares one aspect of the movement between a reference
//! cycle and a user cycle, at each side's deepest frame, and classifies the
//! result into a [`DimensionStatus`] band with fixed feedback text.

pub mod depth;
pub mod lateral_tracking;
pub mod symmetry;
pub mod trunk_lean;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::landmarks::{FrameRecord, LandmarkPoint};

pub use depth::DepthScorer;
pub use lateral_tracking::LateralTrackingScorer;
pub use symmetry::SymmetryScorer;
pub use trunk_lean::TrunkLeanScorer;

// ---------------------------------------------------------------------------
// Status and result types
// ---------------------------------------------------------------------------

/// Verdict for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Pass,
    Warn,
    Fail,
}

impl DimensionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

/// The biomechanical aspects being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Depth,
    LateralTracking,
    TrunkLean,
    Symmetry,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::LateralTracking => "lateral_tracking",
            Self::TrunkLean => "trunk_lean",
            Self::Symmetry => "symmetry",
        }
    }
}

/// Outcome of scoring one dimension.
///
/// `reference_value` and `user_value` are display-rounded; classification
/// always happens on the unrounded metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub status: DimensionStatus,
    pub reference_value: Option<f64>,
    pub user_value: Option<f64>,
    pub message: String,
    pub suggestion: String,
}

// ---------------------------------------------------------------------------
// Scorer trait
// ---------------------------------------------------------------------------

/// One independently replaceable scoring function.
pub trait DimensionScorer: Send + Sync {
    /// The dimension this scorer produces.
    fn dimension(&self) -> Dimension;

    /// Score the user cycle against the reference cycle.
    ///
    /// Fails with [`CoreError::Validation`] when either cycle has no frame
    /// with the landmarks the metric needs.
    fn score(
        &self,
        reference: &[FrameRecord],
        user: &[FrameRecord],
    ) -> Result<DimensionResult, CoreError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Band edges for a lower-is-better metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    /// Values strictly below this pass.
    pub pass_below: f64,
    /// Values strictly below this (and not passing) warn; the rest fail.
    pub warn_below: f64,
}

impl Bands {
    /// Half-open, left-inclusive classification: a value equal to an edge
    /// falls into the worse band.
    pub fn classify(&self, value: f64) -> DimensionStatus {
        if value < self.pass_below {
            DimensionStatus::Pass
        } else if value < self.warn_below {
            DimensionStatus::Warn
        } else {
            DimensionStatus::Fail
        }
    }
}

/// The deepest frame of a cycle: the first frame with the largest mean hip
/// `y`. Frames without both hip points are skipped.
pub fn deepest_frame(frames: &[FrameRecord]) -> Option<&FrameRecord> {
    let mut deepest: Option<(&FrameRecord, f64)> = None;
    for frame in frames {
        let Some(hip_y) = frame.mean_hip_y() else {
            continue;
        };
        match deepest {
            Some((_, best)) if hip_y <= best => {}
            _ => deepest = Some((frame, hip_y)),
        }
    }
    deepest.map(|(frame, _)| frame)
}

/// [`deepest_frame`], failing with a validation error naming `side`.
pub(crate) fn require_deepest<'a>(
    frames: &'a [FrameRecord],
    side: &str,
) -> Result<&'a FrameRecord, CoreError> {
    deepest_frame(frames).ok_or_else(|| {
        CoreError::Validation(format!("{side} cycle has no frame with both hip landmarks"))
    })
}

/// Landmark `index` of `frame`, failing with a validation error.
pub(crate) fn require_point<'a>(
    frame: &'a FrameRecord,
    index: usize,
    side: &str,
) -> Result<&'a LandmarkPoint, CoreError> {
    frame.point(index).ok_or_else(|| {
        CoreError::Validation(format!(
            "{side} frame {} is missing landmark {index}",
            frame.frame_index
        ))
    })
}

/// Round to a fixed number of decimals for display.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
