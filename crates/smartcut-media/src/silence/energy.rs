//! Windowed-RMS energy detector.

use std::path::Path;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use smartcut_models::{SilenceInterval, TimeInterval};

use super::audio::{extract_audio_pcm, load_samples};
use super::config::DetectionConfig;
use super::SilenceDetector;
use crate::error::{MediaError, MediaResult};

/// Default silence detector: thresholds a windowed RMS envelope of the
/// decoded audio.
#[derive(Debug, Clone, Default)]
pub struct EnergyDetector {
    config: DetectionConfig,
}

impl EnergyDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }
}

#[async_trait]
impl SilenceDetector for EnergyDetector {
    async fn detect(&self, source: &Path) -> MediaResult<Vec<SilenceInterval>> {
        if !source.exists() {
            return Err(MediaError::FileNotFound(source.to_path_buf()));
        }

        let temp_audio = NamedTempFile::new()?;
        extract_audio_pcm(source, temp_audio.path(), self.config.sample_rate).await?;
        let samples = load_samples(temp_audio.path()).await?;

        if samples.is_empty() {
            return Err(MediaError::NoAudioData);
        }

        let intervals = scan_envelope(&samples, &self.config);

        debug!(
            samples = samples.len(),
            intervals = intervals.len(),
            threshold = self.config.threshold,
            min_duration = self.config.min_duration,
            "Silence detection complete"
        );

        Ok(intervals)
    }
}

/// Single-pass windowed scan over decoded samples.
///
/// Contiguous windows whose RMS sits below the threshold coalesce into a
/// candidate; candidates shorter than `min_duration` are dropped. The final
/// partial window is scanned too, so trailing silence reaches the exact end
/// of the track.
fn scan_envelope(samples: &[f32], config: &DetectionConfig) -> Vec<SilenceInterval> {
    let window = config.window_size().max(1);
    let window_secs = config.window_secs();
    let total_secs = samples.len() as f64 / config.sample_rate as f64;

    let mut intervals = Vec::new();

    // Running silent span: (start time, accumulated rms, window count)
    let mut run: Option<(f64, f64, usize)> = None;

    let mut flush = |run: &mut Option<(f64, f64, usize)>, end_time: f64| {
        if let Some((start, rms_sum, count)) = run.take() {
            let end = end_time.min(total_secs);
            if end - start >= config.min_duration {
                if let Some(iv) = TimeInterval::new(start, end) {
                    let mean = rms_sum / count as f64;
                    let confidence = (config.threshold - mean) / config.threshold;
                    intervals.push(SilenceInterval::new(iv, confidence));
                }
            }
        }
    };

    for (i, chunk) in samples.chunks(window).enumerate() {
        let rms = window_rms(chunk);
        let window_start = i as f64 * window_secs;

        if rms < config.threshold {
            match run.as_mut() {
                Some((_, rms_sum, count)) => {
                    *rms_sum += rms;
                    *count += 1;
                }
                None => run = Some((window_start, rms, 1)),
            }
        } else {
            flush(&mut run, window_start);
        }
    }

    flush(&mut run, total_secs);

    intervals
}

/// RMS of one analysis window on the normalized linear scale.
fn window_rms(chunk: &[f32]) -> f64 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = chunk.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum_sq / chunk.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: f64, min_duration: f64) -> DetectionConfig {
        DetectionConfig {
            threshold,
            min_duration,
            window_ms: 50,
            sample_rate: 16_000,
        }
    }

    /// Build a sample buffer from (amplitude, seconds) spans.
    fn tone(spans: &[(f32, f64)]) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(amp, secs) in spans {
            let n = (secs * 16_000.0) as usize;
            // Square wave so window RMS equals the amplitude exactly
            samples.extend((0..n).map(|i| if i % 2 == 0 { amp } else { -amp }));
        }
        samples
    }

    #[test]
    fn test_all_loud() {
        let samples = tone(&[(0.8, 3.0)]);
        assert!(scan_envelope(&samples, &config(0.5, 1.0)).is_empty());
    }

    #[test]
    fn test_all_silent() {
        let samples = tone(&[(0.0, 3.0)]);
        let intervals = scan_envelope(&samples, &config(0.5, 1.0));
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, 0.0);
        assert!((intervals[0].end - 3.0).abs() < 0.051);
        // Digital silence sits maximally far below the threshold
        assert!((intervals[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_interior_silence() {
        let samples = tone(&[(0.8, 2.0), (0.0, 2.0), (0.8, 2.0)]);
        let intervals = scan_envelope(&samples, &config(0.5, 1.0));
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 2.0).abs() < 0.051);
        assert!((intervals[0].end - 4.0).abs() < 0.051);
    }

    #[test]
    fn test_short_silence_dropped() {
        let samples = tone(&[(0.8, 2.0), (0.0, 0.4), (0.8, 2.0)]);
        assert!(scan_envelope(&samples, &config(0.5, 1.0)).is_empty());
    }

    #[test]
    fn test_leading_and_trailing_reported() {
        let samples = tone(&[(0.0, 1.5), (0.8, 2.0), (0.0, 1.5)]);
        let intervals = scan_envelope(&samples, &config(0.5, 1.0));
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, 0.0);
        assert!((intervals[1].end - 5.0).abs() < 0.051);
    }

    #[test]
    fn test_ascending_order() {
        let samples = tone(&[
            (0.0, 1.2),
            (0.8, 1.0),
            (0.0, 1.2),
            (0.8, 1.0),
            (0.0, 1.2),
        ]);
        let intervals = scan_envelope(&samples, &config(0.5, 1.0));
        assert_eq!(intervals.len(), 3);
        for pair in intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_confidence_tracks_energy() {
        // Quieter silence gets higher confidence
        let quiet = tone(&[(0.05, 2.0)]);
        let quieter = tone(&[(0.01, 2.0)]);
        let cfg = config(0.5, 1.0);
        let a = scan_envelope(&quiet, &cfg)[0].confidence;
        let b = scan_envelope(&quieter, &cfg)[0].confidence;
        assert!(b > a);
        assert!(a > 0.0 && b <= 1.0);
    }
}
