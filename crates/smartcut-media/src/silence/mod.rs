//! Silence detection over decoded audio.
//!
//! The detector runs once per upload, synchronously, before any cut job.
//! It is a single-pass streaming scan with no backtracking:
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌────────────────┐
//! │ Source media │───►│ FFmpeg decode │───►│ Windowed RMS   │
//! │ (any format) │    │ 16kHz mono    │    │ envelope scan  │
//! └──────────────┘    │ f32le PCM     │    │ (50ms windows) │
//!                     └───────────────┘    └────────────────┘
//! ```
//!
//! The DSP strategy is swappable behind [`SilenceDetector`]: the default
//! [`EnergyDetector`] thresholds a windowed RMS envelope, while
//! [`TranscriptGapDetector`] derives silence from the gaps between
//! transcription segments without touching the audio at all.
//!
//! Energy units: windowed *linear RMS* over normalized f32 samples, where
//! 0.0 is digital silence and 1.0 a full-scale signal. The threshold is on
//! the same scale.

mod audio;
mod config;
mod energy;
mod transcript;

pub use config::DetectionConfig;
pub use energy::EnergyDetector;
pub use transcript::TranscriptGapDetector;

use std::path::Path;

use async_trait::async_trait;

use smartcut_models::SilenceInterval;

use crate::error::MediaResult;

/// Strategy for producing candidate silence intervals from a source file.
///
/// Implementations return intervals in ascending order, on the original
/// source timeline. Silence touching the very start or end of the track is
/// reported, not trimmed, so the planner can cut leading/trailing silence.
#[async_trait]
pub trait SilenceDetector: Send + Sync {
    /// Detect silence in `source`.
    ///
    /// Fails with a decode error when the audio cannot be read; there is no
    /// partial result.
    async fn detect(&self, source: &Path) -> MediaResult<Vec<SilenceInterval>>;
}
