//! Analysis task lifecycle.
//!
//! One run takes a task from `pending` through `processing` to `completed`
//! or `failed`:
//!
//! 1. load the task and claim it (`pending -> processing`)
//! 2. read both video records and fetch their bytes
//! 3. extract both landmark sequences concurrently
//! 4. segment each sequence and keep its first cycle
//! 5. compare the two cycles and compute the overall score
//! 6. store the result and mark the task `completed`
//!
//! Any step error marks the task `failed` with the error's text. There is
//! no retry and no cancellation.

use std::sync::Arc;
use std::time::Duration;

use movecheck_core::comparison::{ComparisonEngine, OverallScore};
use movecheck_core::landmarks::{FrameRecord, LandmarkSequence};
use movecheck_core::segmentation::SegmentationEngine;
use movecheck_core::task_status::TaskStatus;
use movecheck_core::types::EntityId;
use movecheck_db::models::analysis_result::NewAnalysisResult;
use movecheck_db::models::analysis_task::{AnalysisTask, TaskTransition};
use tokio_util::task::TaskTracker;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::media::MediaStore;
use crate::pose::PoseExtractor;
use crate::store::AnalysisStore;

const REFERENCE: &str = "reference";
const USER: &str = "user";

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(OverallScore),
    /// The task was marked failed with this message.
    Failed(String),
    /// The task was not pending, so nothing was done. Carries the status it
    /// was found in, `None` if its status id is unknown.
    Skipped(Option<TaskStatus>),
}

/// Drives analysis runs. Cheap to clone; clones share the collaborators and
/// the in-flight run tracker.
#[derive(Clone)]
pub struct AnalysisRunner {
    store: Arc<dyn AnalysisStore>,
    media: Arc<dyn MediaStore>,
    pose: Arc<dyn PoseExtractor>,
    segmentation: SegmentationEngine,
    comparison: Arc<ComparisonEngine>,
    config: PipelineConfig,
    tracker: TaskTracker,
}

impl AnalysisRunner {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        media: Arc<dyn MediaStore>,
        pose: Arc<dyn PoseExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            media,
            pose,
            segmentation: SegmentationEngine::new(config.segmentation),
            comparison: Arc::new(ComparisonEngine::default()),
            config,
            tracker: TaskTracker::new(),
        }
    }

    /// Replace the default comparison engine.
    pub fn with_comparison_engine(mut self, engine: ComparisonEngine) -> Self {
        self.comparison = Arc::new(engine);
        self
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Background dispatch
    // -----------------------------------------------------------------------

    /// Run `task_id` on a tracked background task.
    pub fn spawn(&self, task_id: EntityId) {
        let runner = self.clone();
        self.tracker.spawn(async move {
            if let Err(e) = runner.run(task_id).await {
                tracing::error!(%task_id, error = %e, "Analysis run aborted");
            }
        });
    }

    /// Number of runs still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting runs and wait for in-flight ones. Returns `false` if
    /// `timeout` elapsed first.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        if !drained {
            tracing::warn!(
                in_flight = self.tracker.len(),
                "Analysis runs still in flight at shutdown"
            );
        }
        drained
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Take one task through its lifecycle.
    ///
    /// Returns `Err` only when the task cannot be found or its `failed`
    /// status cannot be written. Step failures, including a failed
    /// `completed` write, are recorded on the task and reported as
    /// [`RunOutcome::Failed`].
    pub async fn run(&self, task_id: EntityId) -> Result<RunOutcome, PipelineError> {
        let task = self
            .store
            .find_task(task_id)
            .await
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?
            .ok_or_else(|| PipelineError::InputMissing(format!("task {task_id} not found")))?;

        let claimed = self
            .store
            .transition_task(task_id, TaskTransition::Start)
            .await
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?;
        if !claimed {
            let status = self
                .store
                .find_task(task_id)
                .await
                .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?
                .and_then(|current| current.status());
            match status {
                Some(status) => {
                    tracing::info!(%task_id, status = %status, "Task is not pending, skipping")
                }
                None => tracing::warn!(%task_id, "Task has an unknown status, skipping"),
            }
            return Ok(RunOutcome::Skipped(status));
        }
        tracing::info!(%task_id, "Analysis started");

        match self.execute(&task).await {
            Ok(overall) => {
                if let Err(e) = self.finish(task_id, TaskTransition::Complete).await {
                    let error_message = e.to_string();
                    tracing::error!(
                        %task_id,
                        error = %error_message,
                        "Could not mark task completed",
                    );
                    self.finish(
                        task_id,
                        TaskTransition::Fail {
                            error_message: error_message.clone(),
                        },
                    )
                    .await?;
                    return Ok(RunOutcome::Failed(error_message));
                }
                tracing::info!(
                    %task_id,
                    score = overall.score,
                    grade = overall.grade.as_str(),
                    "Analysis completed",
                );
                Ok(RunOutcome::Completed(overall))
            }
            Err(e) => {
                let error_message = e.to_string();
                tracing::error!(%task_id, error = %error_message, "Analysis failed");
                self.finish(
                    task_id,
                    TaskTransition::Fail {
                        error_message: error_message.clone(),
                    },
                )
                .await?;
                Ok(RunOutcome::Failed(error_message))
            }
        }
    }

    async fn finish(&self, task_id: EntityId, transition: TaskTransition) -> Result<(), PipelineError> {
        let target = transition.target();
        let applied = self
            .store
            .transition_task(task_id, transition)
            .await
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?;
        if !applied {
            tracing::warn!(%task_id, target = %target, "Task left processing before the run finished");
        }
        Ok(())
    }

    async fn execute(&self, task: &AnalysisTask) -> Result<OverallScore, PipelineError> {
        let (reference_video, user_video) = tokio::try_join!(
            self.load_video(task.reference_video_id, REFERENCE),
            self.load_video(task.user_video_id, USER),
        )?;

        let (reference, user) = tokio::try_join!(
            self.extract(reference_video, REFERENCE),
            self.extract(user_video, USER),
        )?;

        let reference_frames = self.first_cycle(&reference, REFERENCE)?;
        let user_frames = self.first_cycle(&user, USER)?;

        let comparison = self.comparison.compare(&reference_frames, &user_frames)?;
        let overall = OverallScore::from_result(&comparison);

        let skeleton_data = if self.config.store_skeleton_snapshot {
            Some(skeleton_snapshot(&reference_frames, &user_frames)?)
        } else {
            None
        };
        let result =
            NewAnalysisResult::from_comparison(task.id, &comparison, &overall, skeleton_data)
                .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?;
        self.store
            .save_result(&result)
            .await
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?;

        Ok(overall)
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Video record lookup followed by the byte download.
    async fn load_video(&self, video_id: EntityId, side: &str) -> Result<Vec<u8>, PipelineError> {
        let video = self
            .store
            .find_video(video_id)
            .await
            .map_err(|e| PipelineError::InputMissing(format!("{side} video {video_id}: {e}")))?
            .ok_or_else(|| {
                PipelineError::InputMissing(format!("{side} video {video_id} not found"))
            })?;

        let bytes = self
            .media
            .fetch_bytes(&video.file_path)
            .await
            .map_err(|e| PipelineError::InputMissing(format!("{side} video file: {e}")))?;
        tracing::debug!(%video_id, side, bytes = bytes.len(), "Fetched video");
        Ok(bytes)
    }

    async fn extract(
        &self,
        video: Vec<u8>,
        side: &'static str,
    ) -> Result<LandmarkSequence, PipelineError> {
        let extraction = self
            .pose
            .extract(video)
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("{side} video: {e}")))?;

        if !extraction.success {
            let reason = extraction.error.as_deref().unwrap_or("unknown error");
            return Err(PipelineError::ExtractionFailed(format!(
                "{side} video: {reason}"
            )));
        }
        if extraction.frames.valid_frame_count() == 0 {
            return Err(PipelineError::DetectionEmpty(side));
        }
        tracing::debug!(
            side,
            frames = extraction.frames.len(),
            valid_frames = extraction.frames.valid_frame_count(),
            "Extracted landmarks",
        );
        Ok(extraction.frames)
    }

    /// Frames of the first detected cycle.
    fn first_cycle(
        &self,
        sequence: &LandmarkSequence,
        side: &str,
    ) -> Result<Vec<FrameRecord>, PipelineError> {
        let segmentation = self.segmentation.detect(sequence);
        let Some(cycle) = segmentation.cycles.first() else {
            return Err(PipelineError::SegmentationFailed(format!(
                "{side} video has {} valid frames, at least {} required",
                segmentation.valid_frames,
                self.segmentation.config().min_cycle_duration
            )));
        };
        if segmentation.used_fallback && self.config.strict_segmentation {
            return Err(PipelineError::SegmentationFailed(format!(
                "no clear repetition found in {side} video"
            )));
        }
        tracing::debug!(
            side,
            cycles = segmentation.cycles.len(),
            start = cycle.start_frame,
            bottom = cycle.bottom_frame,
            end = cycle.end_frame,
            fallback = segmentation.used_fallback,
            "Selected first cycle",
        );
        Ok(sequence.cycle_frames(cycle))
    }
}

/// `{reference: [...], user: [...]}` copy of the compared frames.
fn skeleton_snapshot(
    reference: &[FrameRecord],
    user: &[FrameRecord],
) -> Result<serde_json::Value, PipelineError> {
    let snapshot = serde_json::json!({
        "reference": serde_json::to_value(reference)
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?,
        "user": serde_json::to_value(user)
            .map_err(|e| PipelineError::PersistenceFailed(e.to_string()))?,
    });
    Ok(snapshot)
}
