#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the Smart Cut engine.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with progress parsing,
//!   timeout, and cancellation support
//! - Source media probing (duration, streams, keyframes)
//! - Silence detection over decoded audio (swappable strategy)
//! - Keep-plan segment extraction (stream-copy fast path, re-encode
//!   slow path) and concat assembly

pub mod assemble;
pub mod command;
pub mod error;
pub mod extract;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod silence;

pub use assemble::assemble_segments;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use extract::{decide_job_mode, decide_segment_mode, extract_segment, SegmentMode};
pub use fs_utils::move_file;
pub use probe::{get_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
pub use silence::{EnergyDetector, SilenceDetector, TranscriptGapDetector};
