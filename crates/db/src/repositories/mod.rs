//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod analysis_result_repo;
pub mod analysis_task_repo;
pub mod video_upload_repo;

pub use analysis_result_repo::AnalysisResultRepo;
pub use analysis_task_repo::AnalysisTaskRepo;
pub use video_upload_repo::VideoUploadRepo;
