//! Analysis task lifecycle and the collaborators it drives.
//!
//! [`runner::AnalysisRunner`] takes a pending task through
//! `processing` to `completed` or `failed`, pulling videos from a
//! [`media::MediaStore`], landmarks from a [`pose::PoseExtractor`], and
//! persisting through an [`store::AnalysisStore`].

pub mod config;
pub mod error;
pub mod media;
pub mod memory;
pub mod pose;
pub mod runner;
pub mod store;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::AnalysisRunner;
