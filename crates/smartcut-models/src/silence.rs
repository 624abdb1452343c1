//! Silence detection contracts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::interval::TimeInterval;

/// A detected silent interval with a confidence score.
///
/// Produced by a silence detector, read-only downstream. The wire shape
/// carries the redundant `duration` field because callers display it
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SilenceInterval {
    /// Start time in seconds on the source timeline.
    pub start: f64,
    /// End time in seconds on the source timeline.
    pub end: f64,
    /// Length in seconds (`end - start`).
    pub duration: f64,
    /// Detector-assigned likelihood in `[0, 1]` that the interval is
    /// non-speech silence.
    pub confidence: f64,
}

impl SilenceInterval {
    /// Build from an interval and a confidence score, clamping the score
    /// into `[0, 1]`.
    pub fn new(interval: TimeInterval, confidence: f64) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            duration: interval.duration(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The underlying time interval.
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Caller-supplied detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct DetectionParams {
    /// Normalized energy cutoff: a window is silent when its RMS sits below
    /// this value. Linear scale where 0.0 is digital silence and 1.0 is a
    /// full-scale signal.
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,

    /// Minimum silence length in seconds; shorter candidates are discarded.
    #[serde(default = "default_min_duration")]
    #[validate(range(min = 0.0))]
    pub min_duration: f64,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_min_duration() -> f64 {
    1.0
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_duration: default_min_duration(),
        }
    }
}
