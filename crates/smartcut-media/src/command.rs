//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position before the input (fast, keyframe-aligned).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Set seek position after the input (accurate, decodes up to the point).
    pub fn output_seek(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format!("{:.3}", seconds))
    }

    /// Set output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Stream-copy both audio and video.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));
        metrics::counter!("smartcut_ffmpeg_invocations_total").increment(1);

        // A dropped future (task abort, job timeout) must take the
        // transcode down with it.
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child.stderr.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("stderr not captured", None, None)
        })?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines and diagnostics share stderr; keep the tail of the
        // non-progress lines for error reporting.
        let progress_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut last_lines: Vec<String> = Vec::new();

            while let Ok(Some(line)) = reader.next_line().await {
                match parse_progress_line(&line, &mut current_progress) {
                    Some(progress) => progress_callback(progress.clone()),
                    None if !line.contains('=') => {
                        if last_lines.len() >= 8 {
                            last_lines.remove(0);
                        }
                        last_lines.push(line);
                    }
                    None => {}
                }
            }

            last_lines.join("\n")
        });

        let result = self.wait_for_completion(&mut child).await;
        let stderr_tail = progress_handle.await.unwrap_or_default();

        match result {
            Err(MediaError::FfmpegFailed {
                message, exit_code, ..
            }) => Err(MediaError::FfmpegFailed {
                message,
                stderr: (!stderr_tail.is_empty()).then_some(stderr_tail),
                exit_code,
            }),
            other => other,
        }
    }

    /// Wait for the child process, racing it against the timeout and the
    /// cancellation signal. Losing the race kills the process.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<()> {
        let timeout_secs = self.timeout_secs;
        let cancel = self.cancel_rx.clone();

        let deadline = async move {
            match timeout_secs {
                Some(secs) => {
                    tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
                    secs
                }
                None => std::future::pending().await,
            }
        };
        let cancelled = async move {
            match cancel {
                Some(mut rx) => {
                    // A closed channel can never signal cancellation
                    if rx.wait_for(|c| *c).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = child.wait() => {
                let status = result?;
                if status.success() {
                    Ok(())
                } else {
                    Err(MediaError::ffmpeg_failed(
                        "FFmpeg exited with non-zero status",
                        None,
                        status.code(),
                    ))
                }
            }
            secs = deadline => {
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
            _ = cancelled => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

/// Parse a progress line from FFmpeg's -progress output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds in modern FFmpeg builds
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "out_time" => {
                current.out_time = value.to_string();
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    current.fps = fps;
                }
            }
            "speed" => {
                if value != "N/A" {
                    if let Some(speed_str) = value.strip_suffix('x') {
                        if let Ok(speed) = speed_str.parse() {
                            current.speed = speed;
                        }
                    }
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
