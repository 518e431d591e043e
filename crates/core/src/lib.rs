//! Domain logic for movement comparison.
//!
//! Everything in this crate is pure: no I/O, no global state. The
//! segmentation and comparison engines are plain values that callers
//! construct once and share.

pub mod comparison;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod scoring;
pub mod segmentation;
pub mod task_status;
pub mod types;
pub mod validation;
