//! Background task that drives one job through its state machine.
//!
//! ```text
//! downloading ─► processing ─► downloading ─► completed
//!                    │              │
//!                    └──────────────┴────────► error
//! ```
//!
//! The worker keeps only the job ID. Every write goes through
//! [`JobRegistry::update`], so it never overwrites the record with a stale
//! copy, and a record removed by maintenance is never brought back.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::JobError;
use crate::extractor::{Extractor, FormatProfile};
use crate::job::record::format_elapsed;
use crate::job::{JobPhase, JobRecord, JobRegistry, Quality};

/// Longest media accepted, in seconds.
pub const MAX_DURATION_SECS: u64 = 3600;

pub const MSG_STARTING: &str = "Starting download...";
pub const MSG_FETCHING_INFO: &str = "Fetching info...";
pub const MSG_TOO_LONG: &str = "Audio too long. Max 1 hour allowed.";
pub const MSG_DOWNLOADING: &str = "Downloading audio...";
pub const MSG_COMPLETED: &str = "Download completed successfully.";
pub const MSG_FAILED: &str = "An error occurred during download.";

/// Everything a worker needs besides the job itself.
#[derive(Clone)]
pub struct WorkerContext {
    pub registry: JobRegistry,
    pub extractor: Arc<dyn Extractor>,
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("registry", &self.registry)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

/// Run a job to a terminal state. Never returns an error: every failure is
/// recorded on the job instead.
pub async fn run_job(ctx: WorkerContext, job_id: String, url: String, quality: Quality) {
    match drive(&ctx, &job_id, &url, quality).await {
        Ok(()) => info!(job_id = %job_id, "job completed"),
        Err(e) => {
            let message = match e {
                JobError::Policy { .. } => MSG_TOO_LONG,
                _ => MSG_FAILED,
            };
            warn!(job_id = %job_id, error = %e, "job failed");
            record_failure(&ctx.registry, &job_id, message, e.to_string()).await;
        }
    }
}

/// Mark a job as failed. Shared with the dispatcher's panic supervisor.
pub(crate) async fn record_failure(
    registry: &JobRegistry,
    job_id: &str,
    message: &str,
    error: String,
) {
    let failed_at = Utc::now();
    write(registry, job_id, |r| {
        r.transition(
            JobPhase::Failed {
                error: Some(error),
                failed_at,
            },
            message,
        )
    })
    .await;
}

async fn drive(
    ctx: &WorkerContext,
    job_id: &str,
    url: &str,
    quality: Quality,
) -> Result<(), JobError> {
    let profile = FormatProfile::from(quality);

    let mut started_at: Option<DateTime<Utc>> = None;
    write(&ctx.registry, job_id, |r| {
        started_at = Some(r.started_at());
        r.transition(JobPhase::Downloading { metadata: None }, MSG_STARTING)
    })
    .await;
    let started_at = started_at.unwrap_or_else(Utc::now);

    write(&ctx.registry, job_id, |r| {
        r.transition(JobPhase::Processing, MSG_FETCHING_INFO)
    })
    .await;

    let metadata = ctx.extractor.fetch_info(url, &profile).await?.into_metadata();
    debug!(job_id, title = %metadata.title, duration = metadata.duration, "fetched media info");

    if metadata.duration > MAX_DURATION_SECS as f64 {
        return Err(JobError::Policy {
            duration: metadata.duration,
            limit: MAX_DURATION_SECS,
        });
    }

    let attached = metadata.clone();
    write(&ctx.registry, job_id, |r| {
        r.transition(
            JobPhase::Downloading {
                metadata: Some(attached),
            },
            MSG_DOWNLOADING,
        )
    })
    .await;

    let file = ctx
        .extractor
        .download(url, &profile, &ctx.output_dir)
        .await?;

    let completed_at = Utc::now();
    write(&ctx.registry, job_id, |r| {
        r.transition(
            JobPhase::Completed {
                metadata,
                completed_at,
                download_time: format_elapsed(started_at, completed_at),
                file_size: file.size,
            },
            MSG_COMPLETED,
        )
    })
    .await;
    Ok(())
}

/// Apply a transition; a job removed in the meantime is left removed.
async fn write<F>(registry: &JobRegistry, job_id: &str, f: F)
where
    F: FnOnce(&mut JobRecord),
{
    if let Err(e) = registry.update(job_id, f).await {
        debug!(job_id, error = %e, "dropping update for removed job");
    }
}
