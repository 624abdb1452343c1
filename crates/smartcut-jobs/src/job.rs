//! In-memory job record.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use smartcut_models::{JobFailure, JobId, JobState, JobStatus, KeepPlan};

/// A single cut job tracked by the manager.
///
/// State transitions go through [`Job::transition`], which rejects moves
/// the lifecycle does not allow. Terminal states keep their timestamps so
/// the retention sweep knows when a record became evictable.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub source_path: PathBuf,
    pub working_dir: PathBuf,
    pub output_path: PathBuf,
    pub plan: KeepPlan,
    pub state: JobState,
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        id: JobId,
        source_path: PathBuf,
        working_dir: PathBuf,
        output_path: PathBuf,
        plan: KeepPlan,
    ) -> Self {
        Self {
            id,
            source_path,
            working_dir,
            output_path,
            plan,
            state: JobState::Planning,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Advance to `next` if the lifecycle allows it.
    ///
    /// Returns `false` and leaves the record untouched on an illegal move.
    pub fn transition(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        true
    }

    /// Mark the job failed with the recorded cause.
    pub fn fail(&mut self, failure: JobFailure) -> bool {
        if !self.transition(JobState::Failed) {
            return false;
        }
        self.error = Some(failure);
        true
    }

    /// Snapshot exposed to callers.
    pub fn status(&self) -> JobStatus {
        JobStatus {
            id: self.id.clone(),
            state: self.state,
            error: self.error.clone(),
        }
    }
}
