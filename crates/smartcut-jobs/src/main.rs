//! Smart Cut command-line interface.
//!
//! Two subcommands:
//!
//! ```text
//! smartcut detect <file> [threshold] [min_duration]
//! smartcut cut <file> <start-end>[,<start-end>...]
//! ```
//!
//! `detect` prints the found silence intervals as JSON. `cut` removes the
//! given time ranges, waits for the job and prints the output path.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smartcut_jobs::{spawn_retention_task, JobManager, JobsConfig};
use smartcut_media::silence::DetectionConfig;
use smartcut_media::{check_ffmpeg, check_ffprobe, EnergyDetector, SilenceDetector};
use smartcut_models::timestamp::parse_timestamp;
use smartcut_models::{CutRequest, DetectionParams, JobState, TimeInterval};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("smartcut=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("detect") => detect(&args[1..]).await,
        Some("cut") => cut(&args[1..]).await,
        _ => {
            eprintln!("Usage:");
            eprintln!("  smartcut detect <file> [threshold] [min_duration]");
            eprintln!("  smartcut cut <file> <start-end>[,<start-end>...]");
            std::process::exit(2);
        }
    }
}

async fn detect(args: &[String]) -> Result<()> {
    let Some(file) = args.first() else {
        bail!("detect requires a media file");
    };

    let mut params = DetectionParams::default();
    if let Some(threshold) = args.get(1) {
        params.threshold = threshold
            .parse()
            .context("threshold must be a number in [0, 1]")?;
    }
    if let Some(min_duration) = args.get(2) {
        params.min_duration = min_duration
            .parse()
            .context("min_duration must be a number of seconds")?;
    }

    let detector = EnergyDetector::new(DetectionConfig::from_params(&params));
    let intervals = detector.detect(file.as_ref()).await?;

    info!(
        file,
        count = intervals.len(),
        threshold = params.threshold,
        min_duration = params.min_duration,
        "Silence detection finished"
    );
    println!("{}", serde_json::to_string_pretty(&intervals)?);
    Ok(())
}

async fn cut(args: &[String]) -> Result<()> {
    let Some(file) = args.first() else {
        bail!("cut requires a media file");
    };
    let Some(ranges) = args.get(1) else {
        bail!("cut requires at least one start-end range");
    };

    let remove_intervals = parse_ranges(ranges)?;

    let manager = JobManager::new(JobsConfig::from_env());
    let _retention = spawn_retention_task(manager.clone());

    let request = CutRequest {
        // Replaced with the probed duration at admission.
        source_duration: 0.0,
        remove_intervals,
    };
    let id = manager.submit(PathBuf::from(file), &request).await?;
    info!(job_id = %id, "Cut job submitted");

    loop {
        let status = manager.status(&id).await?;
        match status.state {
            JobState::Ready => {
                let output = manager.result(&id).await?;
                println!("{}", output.display());
                return Ok(());
            }
            JobState::Failed => {
                let failure = status
                    .error
                    .map(|e| format!("{}: {}", e.kind, e.detail))
                    .unwrap_or_else(|| "unknown failure".to_string());
                bail!("Job failed ({failure})");
            }
            _ => tokio::time::sleep(Duration::from_millis(250)).await,
        }
    }
}

/// Parse `start-end[,start-end...]` where each endpoint accepts
/// `HH:MM:SS`, `MM:SS` or plain seconds.
fn parse_ranges(ranges: &str) -> Result<Vec<TimeInterval>> {
    let mut intervals = Vec::new();
    for part in ranges.split(',') {
        let Some((start, end)) = part.split_once('-') else {
            bail!("Range '{part}' is not of the form start-end");
        };
        let start = parse_timestamp(start.trim())?;
        let end = parse_timestamp(end.trim())?;
        let interval = TimeInterval::new(start, end)
            .with_context(|| format!("Range '{part}' is empty or reversed"))?;
        intervals.push(interval);
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges_seconds() {
        let ranges = parse_ranges("2-4,20-23").unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, 2.0);
        assert_eq!(ranges[1].end, 23.0);
    }

    #[test]
    fn test_parse_ranges_timestamps() {
        let ranges = parse_ranges("01:30-02:00").unwrap();
        assert_eq!(ranges[0].start, 90.0);
        assert_eq!(ranges[0].end, 120.0);
    }

    #[test]
    fn test_parse_ranges_rejects_reversed() {
        assert!(parse_ranges("10-5").is_err());
    }
}
