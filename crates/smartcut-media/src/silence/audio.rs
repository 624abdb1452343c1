//! Audio decoding for the energy detector.
//!
//! FFmpeg converts any supported input to raw f32le mono PCM at the
//! detector's sample rate; the scan then runs over the bare samples.

use std::path::Path;
use std::process::Stdio;

use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Decode the audio track of `input` to raw f32le mono PCM at `sample_rate`.
pub(crate) async fn extract_audio_pcm(
    input: &Path,
    output: &Path,
    sample_rate: usize,
) -> MediaResult<()> {
    debug!(
        input = %input.display(),
        output = %output.display(),
        sample_rate,
        "Decoding audio for silence detection"
    );

    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let status = tokio::process::Command::new("ffmpeg")
        .args([
            "-i",
            input.to_str().unwrap_or_default(),
            "-vn",
            "-ar",
            &sample_rate.to_string(),
            "-ac",
            "1",
            "-f",
            "f32le",
            "-y",
            output.to_str().unwrap_or_default(),
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| MediaError::decode_failed(e.to_string()))?;

    if !status.success() {
        return Err(MediaError::decode_failed(format!(
            "FFmpeg exited with code {:?}",
            status.code()
        )));
    }

    let metadata = tokio::fs::metadata(output).await?;
    if metadata.len() == 0 {
        return Err(MediaError::NoAudioData);
    }

    Ok(())
}

/// Load raw f32le samples from a file.
pub(crate) async fn load_samples(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;

    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_samples_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let samples = load_samples(temp.path()).await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_load_samples_roundtrip() {
        let temp = NamedTempFile::new().unwrap();

        let written: Vec<f32> = vec![0.0, 0.5, 1.0, -1.0];
        let bytes: Vec<u8> = written.iter().flat_map(|f| f.to_le_bytes()).collect();
        tokio::fs::write(temp.path(), &bytes).await.unwrap();

        let loaded = load_samples(temp.path()).await.unwrap();
        assert_eq!(loaded.len(), 4);
        for (a, b) in written.iter().zip(&loaded) {
            assert!((a - b).abs() < 0.001);
        }
    }
}
