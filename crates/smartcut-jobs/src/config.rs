//! Job manager configuration.

use std::time::Duration;

/// Job manager configuration.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// Maximum cut jobs running at once
    pub max_concurrent_jobs: usize,
    /// Maximum segments extracted in parallel within a single job
    pub max_segment_parallel: usize,
    /// Whole-job timeout
    pub job_timeout: Duration,
    /// Timeout for a single FFmpeg invocation (one segment or one assembly)
    pub segment_timeout: Duration,
    /// Scratch directory for per-job working files
    pub work_dir: String,
    /// Directory where finished outputs land
    pub output_dir: String,
    /// How long a finished job and its output are kept before eviction
    pub retention: Duration,
    /// How often the retention sweep runs
    pub retention_sweep: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            max_segment_parallel: 4,
            job_timeout: Duration::from_secs(3600), // 1 hour
            segment_timeout: Duration::from_secs(600),
            work_dir: "/tmp/smartcut/work".to_string(),
            output_dir: "/tmp/smartcut/outputs".to_string(),
            retention: Duration::from_secs(3600),
            retention_sweep: Duration::from_secs(60),
        }
    }
}

impl JobsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_jobs: std::env::var("SMARTCUT_MAX_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            max_segment_parallel: std::env::var("SMARTCUT_MAX_SEGMENT_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            job_timeout: Duration::from_secs(
                std::env::var("SMARTCUT_JOB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            segment_timeout: Duration::from_secs(
                std::env::var("SMARTCUT_SEGMENT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            work_dir: std::env::var("SMARTCUT_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/smartcut/work".to_string()),
            output_dir: std::env::var("SMARTCUT_OUTPUT_DIR")
                .unwrap_or_else(|_| "/tmp/smartcut/outputs".to_string()),
            retention: Duration::from_secs(
                std::env::var("SMARTCUT_RETENTION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            retention_sweep: Duration::from_secs(
                std::env::var("SMARTCUT_RETENTION_SWEEP_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}
