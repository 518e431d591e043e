//! Movement cycle segmentation.
//!
//! Splits a landmark sequence into repetitions by tracking the vertical
//! position of the hips: each pronounced local low point of the body (a
//! local maximum of hip `y`) marks the bottom of a repetition, and
//! consecutive bottoms delimit a cycle.
//!
//! When no clear repetition structure can be found the engine falls back to
//! a single cycle spanning every valid frame, so any sequence with enough
//! valid frames always yields something to analyze.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::landmarks::LandmarkSequence;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default hip movement threshold (normalized units).
pub const DEFAULT_HIP_THRESHOLD: f64 = 0.05;

/// Default minimum number of valid frames in a cycle.
pub const DEFAULT_MIN_CYCLE_DURATION: usize = 15;

/// Width of the centered moving-average window applied to the hip signal.
pub const SMOOTHING_WINDOW: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One detected repetition, as original frame indices.
///
/// Always `start_frame <= bottom_frame <= end_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub start_frame: u32,
    pub bottom_frame: u32,
    pub end_frame: u32,
}

/// Tuning parameters for [`SegmentationEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationConfig {
    /// Hip movement threshold. Carried for configuration parity; detection
    /// relies on the mean-of-signal filter instead.
    pub hip_threshold: f64,
    /// Minimum number of valid frames; also sets the padding added around
    /// each detected bottom.
    pub min_cycle_duration: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            hip_threshold: DEFAULT_HIP_THRESHOLD,
            min_cycle_duration: DEFAULT_MIN_CYCLE_DURATION,
        }
    }
}

/// Full outcome of a segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub cycles: Vec<Cycle>,
    /// Number of valid frames the signal was built from.
    pub valid_frames: usize,
    /// `true` when no repetition structure was found and the single
    /// whole-sequence cycle was returned instead.
    pub used_fallback: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless cycle segmentation engine. Construct once and share.
#[derive(Debug, Clone, Default)]
pub struct SegmentationEngine {
    config: SegmentationConfig,
}

impl SegmentationEngine {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Detected cycles ordered by `start_frame`. Empty when the sequence has
    /// fewer than `min_cycle_duration` valid frames.
    pub fn segment(&self, sequence: &LandmarkSequence) -> Vec<Cycle> {
        self.detect(sequence).cycles
    }

    /// Like [`segment`](Self::segment), also reporting whether the fallback
    /// cycle was used.
    pub fn detect(&self, sequence: &LandmarkSequence) -> Segmentation {
        let (frame_indices, hip_signal): (Vec<u32>, Vec<f64>) = sequence
            .frames()
            .iter()
            .filter(|f| f.is_valid())
            .filter_map(|f| f.mean_hip_y().map(|y| (f.frame_index, y)))
            .unzip();

        let valid_frames = frame_indices.len();
        if valid_frames == 0 || valid_frames < self.config.min_cycle_duration {
            tracing::warn!(
                valid_frames,
                required = self.config.min_cycle_duration,
                "Not enough valid frames to segment",
            );
            return Segmentation {
                cycles: Vec::new(),
                valid_frames,
                used_fallback: false,
            };
        }

        let bottoms = find_bottoms(&moving_average(&hip_signal, SMOOTHING_WINDOW));
        tracing::debug!(
            valid_frames,
            bottoms = bottoms.len(),
            hip_threshold = self.config.hip_threshold,
            "Detected movement bottoms",
        );

        let half = self.config.min_cycle_duration / 2;
        let last = valid_frames - 1;
        let cycles: Vec<Cycle> = bottoms
            .windows(2)
            .map(|pair| Cycle {
                start_frame: frame_indices[pair[0].saturating_sub(half)],
                bottom_frame: frame_indices[pair[0]],
                end_frame: frame_indices[(pair[1] + half).min(last)],
            })
            .collect();

        if cycles.is_empty() {
            tracing::warn!(valid_frames, "No clear cycle found, using whole sequence");
            return Segmentation {
                cycles: vec![Cycle {
                    start_frame: frame_indices[0],
                    bottom_frame: frame_indices[valid_frames / 2],
                    end_frame: frame_indices[last],
                }],
                valid_frames,
                used_fallback: true,
            };
        }

        Segmentation {
            cycles,
            valid_frames,
            used_fallback: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Signal helpers
// ---------------------------------------------------------------------------

/// Moving average over full windows only; the output is `window - 1`
/// samples shorter than the input (empty if the input is shorter than the
/// window).
fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return signal.to_vec();
    }
    signal
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Indices (in the unsmoothed signal) of pronounced low points of the body.
///
/// A smoothed sample qualifies when it is strictly above both neighbours and
/// strictly above the signal mean. Returned indices are shifted by the
/// half-window so they address the original valid-frame positions.
fn find_bottoms(smoothed: &[f64]) -> Vec<usize> {
    if smoothed.len() < 3 {
        return Vec::new();
    }
    let mean = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
    let offset = SMOOTHING_WINDOW / 2;

    (1..smoothed.len() - 1)
        .filter(|&i| {
            smoothed[i] > smoothed[i - 1] && smoothed[i] > smoothed[i + 1] && smoothed[i] > mean
        })
        .map(|i| i + offset)
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate segmentation parameters loaded from configuration.
pub fn validate_config(config: &SegmentationConfig) -> Result<(), CoreError> {
    if config.min_cycle_duration == 0 {
        return Err(CoreError::Validation(
            "min_cycle_duration must be at least 1".into(),
        ));
    }
    if !config.hip_threshold.is_finite() || config.hip_threshold < 0.0 {
        return Err(CoreError::Validation(format!(
            "hip_threshold must be a non-negative number, got {}",
            config.hip_threshold
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{FrameRecord, LandmarkPoint, FULL_BODY_LANDMARKS, LEFT_HIP, RIGHT_HIP};

    fn frame(index: u32, hip_y: f64) -> FrameRecord {
        let mut points = vec![LandmarkPoint::new(0.5, 0.5, 0.0, 0.9); FULL_BODY_LANDMARKS];
        points[LEFT_HIP].y = hip_y;
        points[RIGHT_HIP].y = hip_y;
        FrameRecord::detected(index, f64::from(index) / 30.0, points)
    }

    fn sequence(signal: &[f64]) -> LandmarkSequence {
        let frames = signal
            .iter()
            .enumerate()
            .map(|(i, &y)| frame(i as u32, y))
            .collect();
        LandmarkSequence::new(frames).unwrap()
    }

    /// Hip height oscillating between 0.3 and 0.6 with the low body points
    /// (hip y = 0.6) at frames `period/2 + k*period`.
    fn oscillation(frames: usize, period: f64) -> Vec<f64> {
        (0..frames)
            .map(|i| 0.45 - 0.15 * (2.0 * std::f64::consts::PI * i as f64 / period).cos())
            .collect()
    }

    // -- moving_average / find_bottoms ----------------------------------------

    #[test]
    fn moving_average_uses_full_windows() {
        let smoothed = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5);
        assert_eq!(smoothed, vec![3.0, 4.0]);
    }

    #[test]
    fn moving_average_shorter_than_window_is_empty() {
        assert!(moving_average(&[1.0, 2.0], 5).is_empty());
    }

    #[test]
    fn find_bottoms_ignores_peaks_below_mean() {
        // Small bump at index 1 sits below the mean; big bump at 5 does not.
        let smoothed = [0.10, 0.12, 0.10, 0.10, 0.30, 0.50, 0.30, 0.10];
        assert_eq!(find_bottoms(&smoothed), vec![5 + SMOOTHING_WINDOW / 2]);
    }

    #[test]
    fn find_bottoms_requires_strict_peak() {
        let smoothed = [0.1, 0.5, 0.5, 0.1];
        assert!(find_bottoms(&smoothed).is_empty());
    }

    // -- segment --------------------------------------------------------------

    #[test]
    fn too_few_valid_frames_yields_nothing() {
        let engine = SegmentationEngine::default();
        let seq = sequence(&oscillation(14, 20.0));
        assert!(engine.segment(&seq).is_empty());
    }

    #[test]
    fn invalid_frames_do_not_count_toward_minimum() {
        let mut frames: Vec<FrameRecord> =
            (0..10).map(|i| frame(i, 0.4)).collect();
        frames.extend((10..40).map(|i| FrameRecord::no_detection(i, 0.0)));
        let seq = LandmarkSequence::new(frames).unwrap();

        let result = SegmentationEngine::default().detect(&seq);
        assert!(result.cycles.is_empty());
        assert_eq!(result.valid_frames, 10);
    }

    #[test]
    fn oscillation_yields_cycles_between_bottoms() {
        let engine = SegmentationEngine::default();
        let seq = sequence(&oscillation(60, 20.0));

        let result = engine.detect(&seq);
        assert!(!result.used_fallback);
        assert_eq!(
            result.cycles,
            vec![
                Cycle {
                    start_frame: 3,
                    bottom_frame: 10,
                    end_frame: 37,
                },
                Cycle {
                    start_frame: 23,
                    bottom_frame: 30,
                    end_frame: 57,
                },
            ]
        );
    }

    #[test]
    fn constant_signal_falls_back_to_whole_sequence() {
        let engine = SegmentationEngine::default();
        let seq = sequence(&[0.4; 30]);

        let result = engine.detect(&seq);
        assert!(result.used_fallback);
        assert_eq!(
            result.cycles,
            vec![Cycle {
                start_frame: 0,
                bottom_frame: 15,
                end_frame: 29,
            }]
        );
    }

    #[test]
    fn single_bottom_falls_back() {
        let engine = SegmentationEngine::default();
        // One deep dip centred at frame 20.
        let signal: Vec<f64> = (0..40)
            .map(|i| 0.3 + 0.3 * (-((i as f64 - 20.0).powi(2)) / 20.0).exp())
            .collect();
        let result = engine.detect(&sequence(&signal));
        assert!(result.used_fallback);
        assert_eq!(result.cycles.len(), 1);
    }

    #[test]
    fn cycles_map_back_to_original_frame_indices() {
        // Valid frames carry indices 100, 102, 104, ...
        let frames: Vec<FrameRecord> = oscillation(60, 20.0)
            .into_iter()
            .enumerate()
            .map(|(i, y)| frame(100 + 2 * i as u32, y))
            .collect();
        let seq = LandmarkSequence::new(frames).unwrap();

        let cycles = SegmentationEngine::default().segment(&seq);
        assert_eq!(cycles[0].bottom_frame, 120);
        assert_eq!(cycles[0].start_frame, 106);
        assert_eq!(cycles[0].end_frame, 174);
    }

    #[test]
    fn cycles_respect_ordering_invariants() {
        let engine = SegmentationEngine::default();
        for frames in [15, 16, 25, 47, 60, 121] {
            for period in [7.0, 12.0, 20.0, 33.0] {
                let seq = sequence(&oscillation(frames, period));
                let cycles = engine.segment(&seq);
                assert!(!cycles.is_empty(), "frames={frames} period={period}");
                for c in &cycles {
                    assert!(c.start_frame <= c.bottom_frame);
                    assert!(c.bottom_frame <= c.end_frame);
                    assert!(c.end_frame < frames as u32);
                }
                assert!(cycles.windows(2).all(|w| w[0].start_frame <= w[1].start_frame));
            }
        }
    }

    // -- validate_config ------------------------------------------------------

    #[test]
    fn zero_min_duration_rejected() {
        let config = SegmentationConfig {
            min_cycle_duration: 0,
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn default_config_accepted() {
        assert!(validate_config(&SegmentationConfig::default()).is_ok());
    }
}
