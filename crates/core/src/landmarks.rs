//! Per-frame body landmark data produced by the pose-estimation service.
//!
//! Landmark positions follow the 33-point MediaPipe body model. Coordinates
//! are normalized to the frame (top-left origin), so a larger `y` means a
//! point lower in the image.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::segmentation::Cycle;

// ---------------------------------------------------------------------------
// Landmark indices
// ---------------------------------------------------------------------------

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Number of points in a full body model.
pub const FULL_BODY_LANDMARKS: usize = 33;

/// Minimum number of points a frame must carry to take part in analysis.
pub const MIN_LANDMARKS: usize = 25;

// ---------------------------------------------------------------------------
// LandmarkPoint
// ---------------------------------------------------------------------------

/// One tracked anatomical point in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Detector confidence in `[0, 1]`.
    pub visibility: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameRecord
// ---------------------------------------------------------------------------

/// Landmarks for a single video frame, or an explicit "no detection".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_index: u32,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    pub landmarks: Option<Vec<LandmarkPoint>>,
    pub detection_confidence: f64,
}

impl FrameRecord {
    /// A frame where a body was detected. The detection confidence is the
    /// mean landmark visibility, rounded to 3 decimals.
    pub fn detected(frame_index: u32, timestamp: f64, landmarks: Vec<LandmarkPoint>) -> Self {
        let detection_confidence = if landmarks.is_empty() {
            0.0
        } else {
            let total: f64 = landmarks.iter().map(|p| p.visibility).sum();
            (total / landmarks.len() as f64 * 1000.0).round() / 1000.0
        };
        Self {
            frame_index,
            timestamp,
            landmarks: Some(landmarks),
            detection_confidence,
        }
    }

    /// A frame where the detector found no body.
    pub fn no_detection(frame_index: u32, timestamp: f64) -> Self {
        Self {
            frame_index,
            timestamp,
            landmarks: None,
            detection_confidence: 0.0,
        }
    }

    /// `true` when landmarks are present and at least [`MIN_LANDMARKS`] long.
    pub fn is_valid(&self) -> bool {
        self.landmarks
            .as_ref()
            .is_some_and(|points| points.len() >= MIN_LANDMARKS)
    }

    /// The landmark at `index`, if this frame has one.
    pub fn point(&self, index: usize) -> Option<&LandmarkPoint> {
        self.landmarks.as_ref().and_then(|points| points.get(index))
    }

    /// Mean vertical position of the two hips. Larger = lower in the image.
    pub fn mean_hip_y(&self) -> Option<f64> {
        let left = self.point(LEFT_HIP)?;
        let right = self.point(RIGHT_HIP)?;
        Some((left.y + right.y) / 2.0)
    }
}

// ---------------------------------------------------------------------------
// LandmarkSequence
// ---------------------------------------------------------------------------

/// All frames extracted from one video, ordered by `frame_index`.
///
/// Immutable once built. Gaps in frame indices are allowed; duplicates and
/// out-of-order frames are not.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<FrameRecord>", into = "Vec<FrameRecord>")]
pub struct LandmarkSequence {
    frames: Vec<FrameRecord>,
}

impl LandmarkSequence {
    /// Build a sequence, checking ordering and the no-detection invariant.
    pub fn new(frames: Vec<FrameRecord>) -> Result<Self, CoreError> {
        for pair in frames.windows(2) {
            if pair[1].frame_index <= pair[0].frame_index {
                return Err(CoreError::Validation(format!(
                    "frame_index must be strictly ascending, got {} after {}",
                    pair[1].frame_index, pair[0].frame_index
                )));
            }
        }

        if let Some(frame) = frames
            .iter()
            .find(|f| f.landmarks.is_none() && f.detection_confidence != 0.0)
        {
            return Err(CoreError::Validation(format!(
                "frame {} has no landmarks but detection_confidence {}",
                frame.frame_index, frame.detection_confidence
            )));
        }

        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames usable for analysis (see [`FrameRecord::is_valid`]).
    pub fn valid_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_valid()).count()
    }

    /// Owned copies of the frames whose index falls inside `cycle`
    /// (inclusive on both ends).
    pub fn cycle_frames(&self, cycle: &Cycle) -> Vec<FrameRecord> {
        self.frames
            .iter()
            .filter(|f| (cycle.start_frame..=cycle.end_frame).contains(&f.frame_index))
            .cloned()
            .collect()
    }
}

impl TryFrom<Vec<FrameRecord>> for LandmarkSequence {
    type Error = CoreError;

    fn try_from(frames: Vec<FrameRecord>) -> Result<Self, Self::Error> {
        Self::new(frames)
    }
}

impl From<LandmarkSequence> for Vec<FrameRecord> {
    fn from(sequence: LandmarkSequence) -> Self {
        sequence.frames
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn body(hip_y: f64) -> Vec<LandmarkPoint> {
        let mut points = vec![LandmarkPoint::new(0.5, 0.5, 0.0, 0.9); FULL_BODY_LANDMARKS];
        points[LEFT_HIP].y = hip_y;
        points[RIGHT_HIP].y = hip_y + 0.02;
        points
    }

    // -- FrameRecord ----------------------------------------------------------

    #[test]
    fn detected_frame_confidence_is_mean_visibility() {
        let frame = FrameRecord::detected(0, 0.0, body(0.4));
        assert_eq!(frame.detection_confidence, 0.9);
        assert!(frame.is_valid());
    }

    #[test]
    fn no_detection_frame_is_invalid() {
        let frame = FrameRecord::no_detection(3, 0.1);
        assert_eq!(frame.detection_confidence, 0.0);
        assert!(!frame.is_valid());
        assert!(frame.mean_hip_y().is_none());
    }

    #[test]
    fn short_landmark_list_is_invalid() {
        let frame = FrameRecord::detected(0, 0.0, vec![LandmarkPoint::new(0.0, 0.0, 0.0, 1.0); 24]);
        assert!(!frame.is_valid());
    }

    #[test]
    fn mean_hip_y_averages_both_hips() {
        let frame = FrameRecord::detected(0, 0.0, body(0.40));
        let mean = frame.mean_hip_y().unwrap();
        assert!((mean - 0.41).abs() < 1e-12);
    }

    // -- LandmarkSequence -----------------------------------------------------

    #[test]
    fn sequence_rejects_out_of_order_frames() {
        let frames = vec![
            FrameRecord::detected(1, 0.0, body(0.4)),
            FrameRecord::detected(1, 0.1, body(0.4)),
        ];
        assert_matches!(LandmarkSequence::new(frames), Err(CoreError::Validation(_)));
    }

    #[test]
    fn sequence_rejects_confident_missing_detection() {
        let mut frame = FrameRecord::no_detection(0, 0.0);
        frame.detection_confidence = 0.5;
        assert_matches!(LandmarkSequence::new(vec![frame]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn sequence_allows_gaps() {
        let frames = vec![
            FrameRecord::detected(0, 0.0, body(0.4)),
            FrameRecord::no_detection(4, 0.2),
            FrameRecord::detected(9, 0.3, body(0.4)),
        ];
        let sequence = LandmarkSequence::new(frames).unwrap();
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.valid_frame_count(), 2);
    }

    #[test]
    fn cycle_frames_copies_inclusive_range_by_frame_index() {
        let frames = (10..20)
            .map(|i| FrameRecord::detected(i, f64::from(i) / 30.0, body(0.4)))
            .collect();
        let sequence = LandmarkSequence::new(frames).unwrap();
        let cycle = Cycle {
            start_frame: 12,
            bottom_frame: 14,
            end_frame: 15,
        };

        let copied = sequence.cycle_frames(&cycle);
        let indices: Vec<u32> = copied.iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![12, 13, 14, 15]);
    }

    #[test]
    fn sequence_deserializes_through_validation() {
        let json = serde_json::json!([
            {"frame_index": 0, "timestamp": 0.0, "landmarks": null, "detection_confidence": 0.0},
            {"frame_index": 1, "timestamp": 0.033, "landmarks": null, "detection_confidence": 0.0}
        ]);
        let sequence: LandmarkSequence = serde_json::from_value(json).unwrap();
        assert_eq!(sequence.len(), 2);

        let bad = serde_json::json!([
            {"frame_index": 2, "timestamp": 0.0, "landmarks": null, "detection_confidence": 0.0},
            {"frame_index": 1, "timestamp": 0.033, "landmarks": null, "detection_confidence": 0.0}
        ]);
        assert!(serde_json::from_value::<LandmarkSequence>(bad).is_err());
    }
}
