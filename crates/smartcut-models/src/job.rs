//! Job identifiers and states.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cut job.
///
/// Doubles as the download identifier: the output of a `Ready` job remains
/// retrievable by this id, without recomputation, until retention evicts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a cut job.
///
/// `Planning → Extracting → Assembling → Ready`, with any state able to
/// transition to `Failed`. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Computing the keep plan and allocating the working directory.
    #[default]
    Planning,
    /// Extracting keep-plan segments from the source.
    Extracting,
    /// Concatenating extracted segments into the output file.
    Assembling,
    /// Output file available for download.
    Ready,
    /// Job failed; the recorded cause is in the status.
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Planning => "planning",
            JobState::Extracting => "extracting",
            JobState::Assembling => "assembling",
            JobState::Ready => "ready",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready | JobState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobState::Failed {
            return true;
        }
        matches!(
            (self, next),
            (JobState::Planning, JobState::Extracting)
                | (JobState::Extracting, JobState::Assembling)
                | (JobState::Assembling, JobState::Ready)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable failure category, stable across releases so callers
/// can branch on it programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range request fields.
    Validation,
    /// Source media could not be read or decoded.
    Decode,
    /// The cut plan removes 100% of the content.
    EmptyResult,
    /// A segment could not be extracted.
    Extraction,
    /// Concatenation or muxing failed.
    Assembly,
    /// Pool at capacity or disk space insufficient.
    ResourceExhausted,
    /// The job exceeded its wall-clock budget.
    Timeout,
    /// Anything else (IO, bookkeeping).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Decode => "decode",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Assembly => "assembly",
            ErrorKind::ResourceExhausted => "resource_exhausted",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Recorded failure cause: category plus human-readable detail.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

/// Snapshot of a job exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobStatus {
    /// Job / download identifier.
    pub id: JobId,
    /// Current state.
    pub state: JobState,
    /// Recorded failure cause, present iff `state == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}
