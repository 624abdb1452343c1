//! Retention sweep.
//!
//! Finished jobs and their outputs are kept for a bounded window so
//! callers can download results, then evicted.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::manager::JobManager;

/// Spawn the background task that periodically evicts expired jobs.
///
/// A job is expired once it is terminal and its finish time is older than
/// the configured retention window. The task runs until the runtime shuts
/// down; the returned handle can be aborted for a controlled stop.
pub fn spawn_retention_task(manager: JobManager) -> tokio::task::JoinHandle<()> {
    let sweep = manager.config().retention_sweep;
    let retention = manager.config().retention;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            sweep_once(&manager, retention).await;
        }
    })
}

/// One eviction pass over the job table.
async fn sweep_once(manager: &JobManager, retention: Duration) {
    let now = Utc::now();
    let expired: Vec<_> = manager
        .snapshot()
        .await
        .into_iter()
        .filter(|job| {
            job.state.is_terminal()
                && job
                    .finished_at
                    .is_some_and(|t| (now - t).to_std().is_ok_and(|age| age >= retention))
        })
        .map(|job| job.id)
        .collect();
    if !expired.is_empty() {
        debug!(count = expired.len(), "Evicting expired jobs");
    }
    for id in expired {
        manager.evict(&id).await;
    }
}
