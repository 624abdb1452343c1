//! Configuration for energy-based silence detection.

use serde::{Deserialize, Serialize};

use smartcut_models::DetectionParams;

/// Configuration for the windowed-RMS energy detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// RMS cutoff on the normalized linear scale (0.0-1.0).
    ///
    /// A window counts as silent when its RMS sits strictly below this
    /// value.
    pub threshold: f64,

    /// Minimum silence duration in seconds; shorter candidates are dropped.
    pub min_duration: f64,

    /// Analysis window length in milliseconds.
    pub window_ms: u64,

    /// Sample rate the audio is decoded to before scanning.
    pub sample_rate: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_duration: 1.0,
            window_ms: 50,
            sample_rate: 16_000,
        }
    }
}

impl DetectionConfig {
    /// Build from caller-supplied parameters, keeping internal knobs at
    /// their defaults.
    pub fn from_params(params: &DetectionParams) -> Self {
        Self {
            threshold: params.threshold.clamp(0.0, 1.0),
            min_duration: params.min_duration.max(0.0),
            ..Self::default()
        }
    }

    /// Samples per analysis window.
    pub fn window_size(&self) -> usize {
        (self.sample_rate * self.window_ms as usize) / 1000
    }

    /// Window length in seconds.
    pub fn window_secs(&self) -> f64 {
        self.window_ms as f64 / 1000.0
    }
}
