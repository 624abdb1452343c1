//! Transcript-gap silence detection.
//!
//! Derives silence candidates from the gaps between transcription segments
//! instead of analyzing the audio signal. Cheap, but only as good as the
//! transcription timestamps.

use std::path::Path;

use async_trait::async_trait;

use smartcut_models::{SilenceInterval, TimeInterval, TranscriptionSegment};

use super::SilenceDetector;
use crate::error::MediaResult;

/// Gap length at which confidence saturates at 1.0.
const FULL_CONFIDENCE_GAP_SECS: f64 = 5.0;

/// Detector that reports inter-segment gaps of a transcription as silence.
#[derive(Debug, Clone)]
pub struct TranscriptGapDetector {
    segments: Vec<TranscriptionSegment>,
    min_duration: f64,
}

impl TranscriptGapDetector {
    pub fn new(segments: Vec<TranscriptionSegment>, min_duration: f64) -> Self {
        Self {
            segments,
            min_duration: min_duration.max(0.0),
        }
    }
}

#[async_trait]
impl SilenceDetector for TranscriptGapDetector {
    // The source file is not consulted; the transcript already carries the
    // timestamps.
    async fn detect(&self, _source: &Path) -> MediaResult<Vec<SilenceInterval>> {
        Ok(gaps_between_segments(&self.segments, self.min_duration))
    }
}

/// Find gaps of at least `min_duration` between consecutive segments.
///
/// Confidence grows linearly with gap length, saturating at
/// [`FULL_CONFIDENCE_GAP_SECS`].
pub fn gaps_between_segments(
    segments: &[TranscriptionSegment],
    min_duration: f64,
) -> Vec<SilenceInterval> {
    let mut sorted: Vec<&TranscriptionSegment> = segments.iter().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut silences = Vec::new();

    for pair in sorted.windows(2) {
        let gap_start = pair[0].end;
        let gap_end = pair[1].start;

        if gap_end - gap_start < min_duration {
            continue;
        }

        if let Some(iv) = TimeInterval::new(gap_start, gap_end) {
            let confidence = (iv.duration() / FULL_CONFIDENCE_GAP_SECS).min(1.0);
            silences.push(SilenceInterval::new(iv, confidence));
        }
    }

    silences
}
