use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::JobError;
use crate::extractor::Extractor;
use crate::job::{JobRecord, JobRegistry, Quality};
use crate::worker::{self, WorkerContext};

/// Accepted submission handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub download_id: String,
    pub status_url: String,
}

/// Validates submissions, registers them and launches their workers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: WorkerContext,
}

impl Dispatcher {
    pub fn new(
        registry: JobRegistry,
        extractor: Arc<dyn Extractor>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ctx: WorkerContext {
                registry,
                extractor,
                output_dir: output_dir.into(),
            },
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.ctx.registry
    }

    pub fn output_dir(&self) -> &Path {
        &self.ctx.output_dir
    }

    /// Register a new job and start it in the background.
    ///
    /// Returns as soon as the record is inserted; extraction work never runs
    /// on the caller's task.
    pub async fn submit(
        &self,
        url: Option<&str>,
        quality: Option<&str>,
    ) -> Result<Submission, JobError> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| JobError::Validation("No URL provided.".to_owned()))?
            .to_owned();
        let quality = Quality::from_request(quality);

        tokio::fs::create_dir_all(&self.ctx.output_dir).await?;

        let download_id = Uuid::new_v4().to_string();
        self.ctx
            .registry
            .insert(
                download_id.clone(),
                JobRecord::new(url.clone(), quality, Utc::now()),
            )
            .await;
        info!(job_id = %download_id, url = %url, %quality, "job submitted");

        self.spawn_supervised(download_id.clone(), url, quality);

        Ok(Submission {
            status_url: format!("/status/{download_id}"),
            download_id,
        })
    }

    /// Run the worker in its own task and watch it from a detached
    /// supervisor, so a panic only fails its own job.
    fn spawn_supervised(&self, job_id: String, url: String, quality: Quality) {
        let ctx = self.ctx.clone();
        let registry = self.ctx.registry.clone();
        let worker = tokio::spawn(worker::run_job(ctx, job_id.clone(), url, quality));

        tokio::spawn(async move {
            if let Err(e) = worker.await {
                if e.is_panic() {
                    error!(job_id = %job_id, "worker panicked");
                    worker::record_failure(
                        &registry,
                        &job_id,
                        worker::MSG_FAILED,
                        "worker panicked".to_owned(),
                    )
                    .await;
                }
            }
        });
    }
}
