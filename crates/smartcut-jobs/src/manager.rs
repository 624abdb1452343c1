//! Cut job manager.
//!
//! Owns the job table, the concurrency pool and the async pipeline that
//! takes a validated keep plan through extraction and assembly to a
//! downloadable output file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{watch, RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

use smartcut_media::{
    assemble_segments, decide_job_mode, extract_segment, move_file, probe_media, FfmpegRunner,
};
use smartcut_models::{
    format::is_supported_extension, plan, CutRequest, JobId, JobState, JobStatus, KeepPlan,
    TimeInterval,
};

use crate::config::JobsConfig;
use crate::error::{JobError, JobResult};
use crate::job::Job;
use crate::logging::JobLogger;

/// Shared job table.
type JobTable = Arc<RwLock<HashMap<JobId, Job>>>;

/// Manages cut jobs: admission, execution, status and results.
///
/// Cloneable handle; all clones share the same table and pool.
#[derive(Clone)]
pub struct JobManager {
    config: Arc<JobsConfig>,
    pub(crate) jobs: JobTable,
    pool: Arc<Semaphore>,
}

impl JobManager {
    pub fn new(config: JobsConfig) -> Self {
        let pool = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            config: Arc::new(config),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            pool,
        }
    }

    pub fn config(&self) -> &JobsConfig {
        &self.config
    }

    /// Submit a cut job for `source` with the given removal request.
    ///
    /// Validation and planning happen synchronously so malformed requests
    /// and all-content removals are rejected before a job is created.
    /// Admission takes a pool permit without waiting; a full pool is an
    /// immediate `ResourceExhausted`.
    pub async fn submit(
        &self,
        source: impl AsRef<Path>,
        request: &CutRequest,
    ) -> JobResult<JobId> {
        let source = source.as_ref().to_path_buf();

        if !source.exists() {
            return Err(JobError::validation(format!(
                "Source file not found: {}",
                source.display()
            )));
        }
        if !is_supported_extension(&source) {
            return Err(JobError::validation(format!(
                "Unsupported format: {}",
                source.display()
            )));
        }
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "mp4".to_string());

        // Admission first: a full pool is rejected before any probe work
        let permit = self
            .pool
            .clone()
            .try_acquire_owned()
            .map_err(|_| JobError::ResourceExhausted("All job slots busy".to_string()))?;

        // Probe before planning so the plan is validated against the real
        // duration, not a caller-supplied one that may be stale.
        let info = probe_media(&source)
            .await
            .map_err(|e| JobError::Decode(e.to_string()))?;
        let effective = CutRequest {
            source_duration: info.duration,
            remove_intervals: request.remove_intervals.clone(),
        };
        let keep_plan = plan(&effective)?;

        let id = JobId::new();
        let working_dir = Path::new(&self.config.work_dir).join(id.as_str());
        tokio::fs::create_dir_all(&working_dir).await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let output_path =
            Path::new(&self.config.output_dir).join(format!("cut_{stem}_{id}.{extension}"));

        let job = Job::new(
            id.clone(),
            source.clone(),
            working_dir.clone(),
            output_path.clone(),
            keep_plan.clone(),
        );
        self.jobs.write().await.insert(id.clone(), job);

        info!(
            job_id = %id,
            source = %source.display(),
            segments = keep_plan.len(),
            kept_secs = keep_plan.total_duration(),
            "Cut job admitted"
        );

        let manager = self.clone();
        let job_id = id.clone();
        let logger = JobLogger::new(&id, "cut");
        let span = logger.create_span();
        tokio::spawn(
            async move {
                let _permit = permit;
                let timeout = manager.config.job_timeout;
                let result = tokio::time::timeout(
                    timeout,
                    manager.run_pipeline(&job_id, &source, keep_plan, &working_dir, &output_path),
                )
                .await
                .unwrap_or(Err(JobError::Timeout(timeout.as_secs())));

                manager.finish(&job_id, result).await;

                if let Err(e) = tokio::fs::remove_dir_all(&working_dir).await {
                    logger.log_warning(&format!("Working dir cleanup failed: {e}"));
                }
            }
            .instrument(span),
        );

        Ok(id)
    }

    /// Current status snapshot for a job.
    pub async fn status(&self, id: &JobId) -> JobResult<JobStatus> {
        self.jobs
            .read()
            .await
            .get(id)
            .map(Job::status)
            .ok_or_else(|| JobError::NotFound(id.clone()))
    }

    /// Path to the finished output file.
    ///
    /// Only `Ready` jobs have a result; everything else is `NotReady`.
    pub async fn result(&self, id: &JobId) -> JobResult<PathBuf> {
        let jobs = self.jobs.read().await;
        let job = jobs.get(id).ok_or_else(|| JobError::NotFound(id.clone()))?;
        match job.state {
            JobState::Ready => Ok(job.output_path.clone()),
            state => Err(JobError::NotReady {
                id: id.clone(),
                state,
            }),
        }
    }

    /// All tracked jobs (for the retention sweep).
    pub(crate) async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Drop a terminal job record and its output file.
    pub(crate) async fn evict(&self, id: &JobId) {
        let removed = {
            let mut jobs = self.jobs.write().await;
            match jobs.get(id) {
                Some(job) if job.state.is_terminal() => jobs.remove(id),
                _ => None,
            }
        };
        if let Some(job) = removed {
            if let Err(e) = tokio::fs::remove_file(&job.output_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(job_id = %id, "Output eviction failed: {}", e);
                }
            }
            info!(job_id = %id, state = %job.state, "Job evicted");
        }
    }

    async fn transition(&self, id: &JobId, next: JobState) -> JobResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.clone()))?;
        if !job.transition(next) {
            return Err(JobError::validation(format!(
                "Illegal state transition {} -> {}",
                job.state, next
            )));
        }
        Ok(())
    }

    async fn finish(&self, id: &JobId, result: JobResult<()>) {
        let logger = JobLogger::new(id, "cut");
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(id) else {
            return;
        };
        match result {
            Ok(()) => {
                if job.transition(JobState::Ready) {
                    metrics::counter!("smartcut_jobs_completed_total").increment(1);
                    logger.log_completion(&format!(
                        "Output ready at {}",
                        job.output_path.display()
                    ));
                }
            }
            Err(e) => {
                let failure = e.to_failure();
                if job.fail(failure.clone()) {
                    metrics::counter!("smartcut_jobs_failed_total", "kind" => failure.kind.to_string())
                        .increment(1);
                    logger.log_error(&format!("{}: {}", failure.kind, failure.detail));
                }
            }
        }
    }

    async fn run_pipeline(
        &self,
        id: &JobId,
        source: &Path,
        keep_plan: KeepPlan,
        working_dir: &Path,
        output_path: &Path,
    ) -> JobResult<()> {
        let logger = JobLogger::new(id, "extract");
        self.transition(id, JobState::Extracting).await?;

        // A plan that keeps the whole source needs no cutting at all.
        if keep_plan.is_full_source() {
            logger.log_progress("Plan keeps full source, copying input");
            self.transition(id, JobState::Assembling).await?;
            tokio::fs::copy(source, output_path).await?;
            return Ok(());
        }

        logger.log_start(&format!("Extracting {} segments", keep_plan.len()));
        let segment_files = self
            .extract_all(source, keep_plan.segments(), working_dir)
            .await?;

        let logger = logger.with_phase("assemble");
        self.transition(id, JobState::Assembling).await?;
        logger.log_start(&format!("Assembling {} segments", segment_files.len()));

        let assembled = working_dir.join(format!(
            "assembled.{}",
            source.extension().and_then(|e| e.to_str()).unwrap_or("mp4")
        ));
        if let [only] = segment_files.as_slice() {
            // Single kept segment, nothing to concatenate.
            tokio::fs::rename(only, &assembled).await?;
        } else {
            assemble_segments(&segment_files, &assembled, self.config.segment_timeout.as_secs())
                .await
                .map_err(JobError::from_assembly)?;
        }
        move_file(&assembled, output_path)
            .await
            .map_err(JobError::from_assembly)?;

        logger.log_completion("Output assembled");
        Ok(())
    }

    /// Extract every keep-plan segment, bounded by the per-job parallelism
    /// limit. The first failure cancels the in-flight extractions, FFmpeg
    /// processes included.
    async fn extract_all(
        &self,
        source: &Path,
        segments: &[TimeInterval],
        working_dir: &Path,
    ) -> JobResult<Vec<PathBuf>> {
        let info = probe_media(source)
            .await
            .map_err(|e| JobError::Decode(e.to_string()))?;
        let mode = decide_job_mode(source, &info, segments)
            .await
            .map_err(JobError::from_extraction)?;
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_string();

        let limit = Arc::new(Semaphore::new(self.config.max_segment_parallel));
        let timeout_secs = self.config.segment_timeout.as_secs();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let mut tasks: JoinSet<JobResult<()>> = JoinSet::new();
        let mut outputs = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().copied().enumerate() {
            let output = working_dir.join(format!("seg_{index:04}.{extension}"));
            outputs.push(output.clone());

            let source = source.to_path_buf();
            let limit = Arc::clone(&limit);
            let runner = FfmpegRunner::new()
                .with_timeout(timeout_secs)
                .with_cancel(cancel_rx.clone());
            tasks.spawn(async move {
                let _permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|_| JobError::extraction("Segment pool closed"))?;
                debug!(index, ?mode, start = segment.start, end = segment.end, "Extracting segment");
                extract_segment(&source, &output, segment, mode, runner)
                    .await
                    .map_err(JobError::from_extraction)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| JobError::extraction(format!("Extraction task panicked: {e}")))?;
            if let Err(e) = result {
                let _ = cancel_tx.send(true);
                tasks.abort_all();
                return Err(e);
            }
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcut_models::ErrorKind;

    fn test_config(dir: &Path) -> JobsConfig {
        JobsConfig {
            work_dir: dir.join("work").to_string_lossy().into_owned(),
            output_dir: dir.join("out").to_string_lossy().into_owned(),
            ..JobsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let manager = JobManager::new(test_config(dir.path()));
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![],
        };
        let err = manager
            .submit(dir.path().join("missing.mp4"), &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_submit_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.xyz");
        tokio::fs::write(&source, b"data").await.unwrap();

        let manager = JobManager::new(test_config(dir.path()));
        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![],
        };
        let err = manager.submit(&source, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_submit_rejects_when_pool_full() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        tokio::fs::write(&source, b"data").await.unwrap();

        let config = JobsConfig {
            max_concurrent_jobs: 1,
            ..test_config(dir.path())
        };
        let manager = JobManager::new(config);
        let _held = manager.pool.clone().try_acquire_owned().unwrap();

        let request = CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![TimeInterval::new(1.0, 2.0).unwrap()],
        };
        let err = manager.submit(&source, &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }

    #[tokio::test]
    async fn test_status_of_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = JobManager::new(test_config(dir.path()));
        let err = manager.status(&JobId::new()).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_result_requires_ready_state() {
        let dir = tempfile::tempdir().unwrap();
        let manager = JobManager::new(test_config(dir.path()));

        let id = JobId::new();
        let keep_plan = plan(&CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![],
        })
        .unwrap();
        let job = Job::new(
            id.clone(),
            PathBuf::from("/tmp/in.mp4"),
            dir.path().join("work"),
            dir.path().join("out.mp4"),
            keep_plan,
        );
        manager.jobs.write().await.insert(id.clone(), job);

        let err = manager.result(&id).await.unwrap_err();
        assert!(matches!(err, JobError::NotReady { .. }));
    }

    #[tokio::test]
    async fn test_evict_only_removes_terminal_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let manager = JobManager::new(test_config(dir.path()));

        let id = JobId::new();
        let keep_plan = plan(&CutRequest {
            source_duration: 10.0,
            remove_intervals: vec![],
        })
        .unwrap();
        let job = Job::new(
            id.clone(),
            PathBuf::from("/tmp/in.mp4"),
            dir.path().join("work"),
            dir.path().join("out.mp4"),
            keep_plan,
        );
        manager.jobs.write().await.insert(id.clone(), job);

        // Still running, eviction must be a no-op.
        manager.evict(&id).await;
        assert!(manager.status(&id).await.is_ok());

        {
            let mut jobs = manager.jobs.write().await;
            let job = jobs.get_mut(&id).unwrap();
            job.transition(JobState::Extracting);
            job.fail(smartcut_models::JobFailure {
                kind: ErrorKind::Extraction,
                detail: "boom".into(),
            });
        }
        manager.evict(&id).await;
        assert!(matches!(
            manager.status(&id).await.unwrap_err(),
            JobError::NotFound(_)
        ));
    }
}
