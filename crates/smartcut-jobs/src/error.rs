//! Job error types.
//!
//! Every failure maps to a stable [`ErrorKind`] so callers can branch on
//! the category while still getting a human-readable detail string.
//! Nothing is retried inside the core: a deterministic planner fed the
//! same bad input reproduces the same error.

use thiserror::Error;

use smartcut_models::{ErrorKind, JobFailure, JobId, JobState, PlanError};
use smartcut_media::MediaError;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Source media unreadable: {0}")]
    Decode(String),

    #[error("Cut removes all content: {0}")]
    EmptyResult(String),

    #[error("Segment extraction failed: {0}")]
    Extraction(String),

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job {id} is not ready (state: {state})")]
    NotReady { id: JobId, state: JobState },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// The stable failure category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Validation(_) | JobError::NotFound(_) | JobError::NotReady { .. } => {
                ErrorKind::Validation
            }
            JobError::Decode(_) => ErrorKind::Decode,
            JobError::EmptyResult(_) => ErrorKind::EmptyResult,
            JobError::Extraction(_) => ErrorKind::Extraction,
            JobError::Assembly(_) => ErrorKind::Assembly,
            JobError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            JobError::Timeout(_) => ErrorKind::Timeout,
            JobError::Io(_) => ErrorKind::Internal,
        }
    }

    /// The failure record stored on a `Failed` job.
    pub fn to_failure(&self) -> JobFailure {
        JobFailure {
            kind: self.kind(),
            detail: self.to_string(),
        }
    }

    /// Wrap a media error from the extraction phase.
    pub fn from_extraction(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => JobError::Timeout(secs),
            other => JobError::Extraction(other.to_string()),
        }
    }

    /// Wrap a media error from the assembly phase.
    pub fn from_assembly(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => JobError::Timeout(secs),
            other => JobError::Assembly(other.to_string()),
        }
    }
}

impl From<PlanError> for JobError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidDuration(_) => JobError::Validation(err.to_string()),
            PlanError::EmptyResult { .. } => JobError::EmptyResult(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcut_models::TimeInterval;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            JobError::validation("bad").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            JobError::EmptyResult("all gone".into()).kind(),
            ErrorKind::EmptyResult
        );
        assert_eq!(JobError::Timeout(60).kind(), ErrorKind::Timeout);
        assert_eq!(
            JobError::ResourceExhausted("pool full".into()).kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn test_plan_error_conversion() {
        let err: JobError = PlanError::EmptyResult {
            source_duration: 10.0,
            removed: 10.0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);

        let err: JobError = PlanError::InvalidDuration(-1.0).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_media_timeout_maps_to_timeout() {
        let err = JobError::from_extraction(MediaError::Timeout(30));
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err = JobError::from_assembly(MediaError::InvalidMedia("bad".into()));
        assert_eq!(err.kind(), ErrorKind::Assembly);
    }

    #[test]
    fn test_full_removal_produces_empty_result_kind() {
        let request = smartcut_models::CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![TimeInterval { start: 0.0, end: 10.0 }],
        };
        let err: JobError = smartcut_models::plan(&request).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }
}
