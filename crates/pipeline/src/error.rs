use movecheck_core::error::CoreError;

/// Why an analysis run stopped. The `Display` text is stored as the failed
/// task's `error_message`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The task, a video record, or a video file could not be found.
    #[error("Missing input: {0}")]
    InputMissing(String),

    /// The pose collaborator reported a failure for a video.
    #[error("Pose extraction failed: {0}")]
    ExtractionFailed(String),

    /// A video produced no frame with a detected body.
    #[error("No body detected in {0} video")]
    DetectionEmpty(&'static str),

    /// No usable movement cycle was found.
    #[error("Cycle segmentation failed: {0}")]
    SegmentationFailed(String),

    /// A cycle was malformed for scoring.
    #[error("Scoring failed: {0}")]
    Scoring(#[from] CoreError),

    /// The comparison could not be stored.
    #[error("Failed to persist result: {0}")]
    PersistenceFailed(String),
}
