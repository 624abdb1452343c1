//! Cut job lifecycle management.
//!
//! Owns per-job working directories, bounds concurrent pipelines, runs the
//! `Planning → Extracting → Assembling → Ready` state machine, and retains
//! finished outputs until eviction.

pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod manager;
pub mod retention;

pub use config::JobsConfig;
pub use error::{JobError, JobResult};
pub use job::Job;
pub use logging::JobLogger;
pub use manager::JobManager;
pub use retention::spawn_retention_task;
