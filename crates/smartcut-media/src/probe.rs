//! FFprobe media information and keyframe inspection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Source media information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Whether the file carries a video stream
    pub has_video: bool,
    /// Whether the file carries an audio stream
    pub has_audio: bool,
    /// Video codec name, empty for audio-only sources
    pub video_codec: String,
    /// Width in pixels (0 for audio-only)
    pub width: u32,
    /// Height in pixels (0 for audio-only)
    pub height: u32,
    /// Frame rate (0.0 when unknown or audio-only)
    pub fps: f64,
    /// File size in bytes
    pub size: u64,
}

impl MediaInfo {
    /// Duration of one video frame in seconds, when the frame rate is known.
    pub fn frame_interval(&self) -> Option<f64> {
        (self.fps > 0.0).then(|| 1.0 / self.fps)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobePackets {
    #[serde(default)]
    packets: Vec<FfprobePacket>,
}

#[derive(Debug, Deserialize)]
struct FfprobePacket {
    pts_time: Option<String>,
    flags: Option<String>,
}

async fn run_ffprobe(args: &[&str], path: &Path) -> MediaResult<Vec<u8>> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    Ok(output.stdout)
}

/// Probe a media file for stream and format information.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = run_ffprobe(
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ],
        path,
    )
    .await?;

    let probe: FfprobeOutput = serde_json::from_slice(&stdout)?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    if video_stream.is_none() && !has_audio {
        return Err(MediaError::InvalidMedia(
            "No audio or video stream found".to_string(),
        ));
    }

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let fps = video_stream
        .and_then(|s| {
            s.avg_frame_rate
                .as_ref()
                .or(s.r_frame_rate.as_ref())
                .and_then(|r| parse_frame_rate(r))
        })
        .unwrap_or(0.0);

    Ok(MediaInfo {
        duration,
        has_video: video_stream.is_some(),
        has_audio,
        video_codec: video_stream
            .and_then(|s| s.codec_name.clone())
            .unwrap_or_default(),
        width: video_stream.and_then(|s| s.width).unwrap_or(0),
        height: video_stream.and_then(|s| s.height).unwrap_or(0),
        fps,
        size,
    })
}

/// Get media duration in seconds.
pub async fn get_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let info = probe_media(path).await?;
    Ok(info.duration)
}

/// Return video keyframe timestamps within `radius` seconds of `around`.
///
/// Reads only the packets in that interval, so a probe near a cut boundary
/// stays cheap even for long sources.
pub async fn keyframes_near(
    path: impl AsRef<Path>,
    around: f64,
    radius: f64,
) -> MediaResult<Vec<f64>> {
    let path = path.as_ref();
    let from = (around - radius).max(0.0);
    let interval = format!("{:.3}%{:.3}", from, around + radius);

    let stdout = run_ffprobe(
        &[
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_packets",
            "-show_entries",
            "packet=pts_time,flags",
            "-read_intervals",
            &interval,
            "-print_format",
            "json",
        ],
        path,
    )
    .await?;

    let probe: FfprobePackets = serde_json::from_slice(&stdout)?;

    let mut times: Vec<f64> = probe
        .packets
        .iter()
        .filter(|p| p.flags.as_deref().is_some_and(|f| f.contains('K')))
        .filter_map(|p| p.pts_time.as_ref().and_then(|t| t.parse().ok()))
        .collect();
    times.sort_by(f64::total_cmp);

    Ok(times)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[test]
    fn test_frame_interval() {
        let mut info = MediaInfo {
            duration: 10.0,
            has_video: true,
            has_audio: true,
            video_codec: "h264".to_string(),
            width: 1920,
            height: 1080,
            fps: 25.0,
            size: 0,
        };
        assert!((info.frame_interval().unwrap() - 0.04).abs() < 1e-9);

        info.fps = 0.0;
        assert!(info.frame_interval().is_none());
    }

    #[test]
    fn test_packet_json_parsing() {
        let json = r#"{"packets": [
            {"pts_time": "0.000000", "flags": "K__"},
            {"pts_time": "0.040000", "flags": "___"},
            {"pts_time": "2.000000", "flags": "K__"}
        ]}"#;
        let parsed: FfprobePackets = serde_json::from_slice(json.as_bytes()).unwrap();
        let keyframes: Vec<f64> = parsed
            .packets
            .iter()
            .filter(|p| p.flags.as_deref().is_some_and(|f| f.contains('K')))
            .filter_map(|p| p.pts_time.as_ref().and_then(|t| t.parse().ok()))
            .collect();
        assert_eq!(keyframes, vec![0.0, 2.0]);
    }
}
