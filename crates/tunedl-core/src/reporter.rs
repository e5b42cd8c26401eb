//! Read-only queries over the job registry.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::JobError;
use crate::job::record::{epoch_secs, format_date, opt_duration_secs};
use crate::job::{JobRecord, JobRegistry, JobSnapshot, JobStatus, Quality};

/// Full view of one job plus human-readable dates.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
    pub created_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_date: Option<String>,
}

impl From<&JobRecord> for JobDetail {
    fn from(record: &JobRecord) -> Self {
        let snapshot = record.snapshot();
        Self {
            created_date: format_date(snapshot.created_at),
            completed_date: snapshot.completed_at.map(format_date),
            failed_date: snapshot.failed_at.map(format_date),
            snapshot,
        }
    }
}

/// One row of the job listing.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadSummary {
    pub id: String,
    pub status: JobStatus,
    pub message: String,
    #[serde(serialize_with = "epoch_secs")]
    pub created_at: DateTime<Utc>,
    pub created_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "opt_duration_secs"
    )]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub quality: Quality,
}

impl DownloadSummary {
    fn project(id: String, record: &JobRecord) -> Self {
        let s = record.snapshot();
        Self {
            id,
            status: s.status,
            message: s.message,
            created_at: s.created_at,
            created_date: format_date(s.created_at),
            title: s.title,
            artist: s.artist,
            duration: s.duration,
            file_size: s.file_size,
            download_time: s.download_time,
            error: s.error,
            quality: s.quality,
        }
    }
}

/// Per-status counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadStats {
    pub completed: usize,
    pub downloading: usize,
    pub processing: usize,
    pub errors: usize,
}

impl DownloadStats {
    fn count(&mut self, status: JobStatus) {
        match status {
            JobStatus::Completed => self.completed += 1,
            JobStatus::Downloading => self.downloading += 1,
            JobStatus::Processing => self.processing += 1,
            JobStatus::Error => self.errors += 1,
        }
    }
}

/// Listing of every job, newest first.
///
/// An empty registry carries `message` and no `stats`.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadList {
    pub total_downloads: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DownloadStats>,
    pub downloads: Vec<DownloadSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusReporter {
    registry: JobRegistry,
}

impl StatusReporter {
    pub fn new(registry: JobRegistry) -> Self {
        Self { registry }
    }

    pub async fn get_one(&self, id: &str) -> Result<JobDetail, JobError> {
        self.registry
            .get(id)
            .await
            .map(|record| JobDetail::from(&record))
            .ok_or_else(|| JobError::NotFound("Download ID not found".to_owned()))
    }

    pub async fn list_all(&self) -> DownloadList {
        let records = self.registry.list_all().await;
        if records.is_empty() {
            return DownloadList {
                total_downloads: 0,
                stats: None,
                downloads: Vec::new(),
                message: Some("No downloads found".to_owned()),
            };
        }

        let mut stats = DownloadStats::default();
        let mut downloads: Vec<DownloadSummary> = records
            .into_iter()
            .map(|(id, record)| {
                stats.count(record.status());
                DownloadSummary::project(id, &record)
            })
            .collect();
        downloads.sort_by(newest_first);

        DownloadList {
            total_downloads: downloads.len(),
            stats: Some(stats),
            downloads,
            message: None,
        }
    }
}

/// `created_at` descending; equal timestamps fall back to the ID so repeated
/// listings stay in the same order.
fn newest_first(a: &DownloadSummary, b: &DownloadSummary) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
