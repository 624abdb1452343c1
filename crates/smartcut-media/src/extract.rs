//! Keep-plan segment extraction.
//!
//! Each keep-plan entry becomes one segment file in the job's working
//! directory. The extraction mode is decided once per job, before any
//! FFmpeg process starts, so the assembler stays branch-free and its
//! concat inputs share stream parameters.

use std::path::Path;

use tracing::{debug, trace};

use smartcut_models::TimeInterval;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{keyframes_near, MediaInfo};

/// How far ahead of the accurate seek point the coarse input seek lands.
const COARSE_SEEK_LEAD_SECS: f64 = 5.0;

/// How a segment is cut out of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// Stream copy. Valid when both boundaries sit on keyframes (or the
    /// source has no video); preserves quality and is fast.
    Copy,
    /// Frame-accurate re-encode for boundaries inside a keyframe interval.
    Reencode,
}

/// Decide the extraction mode for one keep-plan entry.
///
/// The copy fast path applies when:
/// - the source is audio-only (audio packets are short enough that copy
///   cuts are effectively accurate), or
/// - the source video is H.264 and both cut boundaries land on container
///   keyframes within one frame interval. Other codecs always take the
///   re-encode path.
///
/// The segment start at 0 and the segment end at the source tail are
/// always treated as aligned.
pub async fn decide_segment_mode(
    source: impl AsRef<Path>,
    info: &MediaInfo,
    segment: TimeInterval,
) -> MediaResult<SegmentMode> {
    let source = source.as_ref();

    if !info.has_video {
        return Ok(SegmentMode::Copy);
    }

    if info.video_codec != "h264" {
        return Ok(SegmentMode::Reencode);
    }

    let Some(tolerance) = info.frame_interval() else {
        // Unknown frame rate: no way to judge alignment
        return Ok(SegmentMode::Reencode);
    };

    for boundary in [segment.start, segment.end] {
        if boundary <= tolerance || (info.duration - boundary).abs() <= tolerance {
            continue;
        }
        let keyframes = keyframes_near(source, boundary, 1.0).await?;
        let aligned = keyframes.iter().any(|kf| (kf - boundary).abs() <= tolerance);
        if !aligned {
            debug!(
                boundary,
                "Cut boundary not keyframe-aligned, segment will be re-encoded"
            );
            return Ok(SegmentMode::Reencode);
        }
    }

    Ok(SegmentMode::Copy)
}

/// Decide one extraction mode for an entire keep plan.
///
/// Concat with `-c copy` needs parameter-uniform inputs, and copied
/// segments carry the source's stream parameters while re-encoded ones
/// carry the encoder's. A single boundary that forces re-encoding
/// therefore re-encodes every segment of the job.
pub async fn decide_job_mode(
    source: impl AsRef<Path>,
    info: &MediaInfo,
    segments: &[TimeInterval],
) -> MediaResult<SegmentMode> {
    let source = source.as_ref();
    for segment in segments {
        if decide_segment_mode(source, info, *segment).await? == SegmentMode::Reencode {
            return Ok(SegmentMode::Reencode);
        }
    }
    Ok(SegmentMode::Copy)
}

/// Extract one keep-plan segment to `output`.
///
/// Both audio and video are trimmed against the same source timestamps and
/// timestamps are zeroed (`-avoid_negative_ts make_zero`), so the
/// downstream concat produces contiguous output without A/V drift.
pub async fn extract_segment(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    segment: TimeInterval,
    mode: SegmentMode,
    runner: FfmpegRunner,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        start = segment.start,
        duration = segment.duration(),
        ?mode,
        "Extracting segment"
    );

    let cmd = build_extract_command(input, output, segment, mode);
    let total_ms = (segment.duration() * 1000.0) as i64;

    runner
        .run_with_progress(&cmd, move |p| {
            trace!(
                percent = p.percentage(total_ms),
                "Segment extraction progress"
            );
        })
        .await
}

fn build_extract_command(
    input: &Path,
    output: &Path,
    segment: TimeInterval,
    mode: SegmentMode,
) -> FfmpegCommand {
    match mode {
        SegmentMode::Copy => FfmpegCommand::new(input, output)
            .seek(segment.start)
            .duration(segment.duration())
            .codec_copy()
            .output_args(["-avoid_negative_ts", "make_zero"]),
        SegmentMode::Reencode => {
            // Two-pass seeking: coarse input seek lands on a keyframe ahead
            // of the target, the accurate output seek decodes the rest.
            let coarse = (segment.start - COARSE_SEEK_LEAD_SECS).max(0.0);
            let accurate = segment.start - coarse;

            let cmd = FfmpegCommand::new(input, output)
                .seek(coarse)
                .output_seek(accurate)
                .duration(segment.duration());
            with_container_encoders(cmd, output)
                .output_args(["-avoid_negative_ts", "make_zero"])
        }
    }
}

/// Pick encoders the output container can actually mux.
///
/// WebM only accepts VP8/VP9/AV1 video with Vorbis/Opus audio, and Ogg
/// only Theora; every other container here takes H.264 with AAC.
fn with_container_encoders(cmd: FfmpegCommand, output: &Path) -> FfmpegCommand {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "webm" => cmd
            .video_codec("libvpx-vp9")
            .crf(32)
            // Constant-quality libvpx mode needs the bitrate cap zeroed
            .output_args(["-b:v", "0"])
            .audio_codec("libopus")
            .audio_bitrate("128k"),
        "ogg" | "ogv" => cmd
            .video_codec("libtheora")
            .output_args(["-q:v", "7"])
            .audio_codec("libopus")
            .audio_bitrate("128k"),
        _ => cmd
            .video_codec("libx264")
            .preset("veryfast")
            .crf(20)
            .audio_codec("aac")
            .audio_bitrate("128k"),
    }
}
