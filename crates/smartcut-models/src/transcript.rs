//! Transcription collaborator contract.
//!
//! The cut engine never calls the transcription service itself; it only
//! consumes these shapes for their segment timestamps. Everything beyond
//! `start`/`end` is informational.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One transcribed speech segment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptionSegment {
    #[serde(default)]
    pub id: u32,
    /// Segment start in seconds on the source timeline.
    pub start: f64,
    /// Segment end in seconds on the source timeline.
    pub end: f64,
    #[serde(default)]
    pub text: String,
    /// Speech-recognition confidence signal, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_speech_prob: Option<f64>,
}

/// Full transcription result as delivered by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    pub language: String,
}
