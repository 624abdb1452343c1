//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for the cut pipeline with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use smartcut_models::JobId;

/// Job logger for structured logging with consistent formatting.
///
/// Every log line carries the job ID and the pipeline phase so a single
/// grep reconstructs one job's history from interleaved output.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    phase: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and pipeline phase.
    pub fn new(job_id: &JobId, phase: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            phase: phase.to_string(),
        }
    }

    /// Logger for the same job in a different phase.
    pub fn with_phase(&self, phase: &str) -> Self {
        Self {
            job_id: self.job_id.clone(),
            phase: phase.to_string(),
        }
    }

    /// Log the start of a pipeline phase.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Job started: {}", message
        );
    }

    /// Log a progress update during job execution.
    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Job progress: {}", message
        );
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Job warning: {}", message
        );
    }

    /// Log an error during job execution.
    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Job error: {}", message
        );
    }

    /// Log the completion of a pipeline phase.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Job completed: {}", message
        );
    }

    /// Get the job ID.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            phase = %self.phase
        )
    }
}
