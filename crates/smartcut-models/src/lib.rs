//! Shared data models for the Smart Cut backend.
//!
//! This crate provides Serde-serializable types plus the pure cut-planning
//! logic:
//! - Time intervals and interval algebra (merge/clamp/complement)
//! - Silence detection contracts
//! - Cut requests and keep plans
//! - Job identifiers and states
//! - Transcription contract types (consumed, informational only)

pub mod format;
pub mod interval;
pub mod job;
pub mod plan;
pub mod silence;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use format::{is_supported_extension, SUPPORTED_EXTENSIONS};
pub use interval::TimeInterval;
pub use job::{ErrorKind, JobFailure, JobId, JobState, JobStatus};
pub use plan::{plan, CutRequest, KeepPlan, PlanError};
pub use silence::{DetectionParams, SilenceInterval};
pub use transcript::{TranscriptionResult, TranscriptionSegment};
