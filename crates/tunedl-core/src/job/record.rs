use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

/// Layout used for every human-readable date derived from a timestamp.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle state reported to clients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Downloading,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// `completed` and `error` never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// Named bitrate/format policy requested by the client.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Quality {
    #[default]
    Normal,
    High,
    Maximum,
}

impl Quality {
    /// Resolve the optional request value; anything unrecognised is `normal`.
    pub fn from_request(raw: Option<&str>) -> Self {
        raw.and_then(|q| q.trim().parse().ok()).unwrap_or_default()
    }

    /// Format selector handed to the extraction tool.
    pub fn format_selector(&self) -> &'static str {
        match self {
            Quality::Normal => "bestaudio[abr<=128]/best[abr<=128]",
            Quality::High => "bestaudio[abr<=320]/best[abr<=320]",
            Quality::Maximum => "bestaudio/best",
        }
    }

    /// Transcode bitrate in kbps.
    pub fn audio_bitrate_kbps(&self) -> u32 {
        match self {
            Quality::High => 192,
            _ => 128,
        }
    }
}

/// Metadata attached to a job once the collaborator has described the media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    pub artist: String,
    /// Length in seconds.
    #[serde(serialize_with = "duration_secs")]
    pub duration: f64,
}

/// Phase-specific part of a [`JobRecord`].
///
/// The variant decides which optional fields exist, so a record can never
/// carry both success and failure data.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPhase {
    Downloading {
        metadata: Option<MediaMetadata>,
    },
    Processing,
    Completed {
        metadata: MediaMetadata,
        completed_at: DateTime<Utc>,
        /// Elapsed time rendered as `"<secs>.<tenths>s"`.
        download_time: String,
        file_size: Option<u64>,
    },
    Failed {
        error: Option<String>,
        failed_at: DateTime<Utc>,
    },
}

/// The state of one submission, owned by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    url: String,
    quality: Quality,
    created_at: DateTime<Utc>,
    started_at: DateTime<Utc>,
    pub message: String,
    pub phase: JobPhase,
}

impl JobRecord {
    /// Fresh record in the `downloading` state; `started_at` equals `created_at`.
    pub fn new(url: impl Into<String>, quality: Quality, created_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            quality,
            created_at,
            started_at: created_at,
            message: "Starting download...".to_owned(),
            phase: JobPhase::Downloading { metadata: None },
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn status(&self) -> JobStatus {
        match self.phase {
            JobPhase::Downloading { .. } => JobStatus::Downloading,
            JobPhase::Processing => JobStatus::Processing,
            JobPhase::Completed { .. } => JobStatus::Completed,
            JobPhase::Failed { .. } => JobStatus::Error,
        }
    }

    pub fn metadata(&self) -> Option<&MediaMetadata> {
        match &self.phase {
            JobPhase::Downloading { metadata } => metadata.as_ref(),
            JobPhase::Completed { metadata, .. } => Some(metadata),
            JobPhase::Processing | JobPhase::Failed { .. } => None,
        }
    }

    /// Move to a new phase with a new display message.
    pub fn transition(&mut self, phase: JobPhase, message: impl Into<String>) {
        self.phase = phase;
        self.message = message.into();
    }

    /// Flat wire view of the record.
    pub fn snapshot(&self) -> JobSnapshot {
        let metadata = self.metadata();
        let mut snapshot = JobSnapshot {
            status: self.status(),
            message: self.message.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            url: self.url.clone(),
            quality: self.quality,
            title: metadata.map(|m| m.title.clone()),
            artist: metadata.map(|m| m.artist.clone()),
            duration: metadata.map(|m| m.duration),
            file_size: None,
            completed_at: None,
            download_time: None,
            error: None,
            failed_at: None,
        };
        match &self.phase {
            JobPhase::Completed {
                completed_at,
                download_time,
                file_size,
                ..
            } => {
                snapshot.completed_at = Some(*completed_at);
                snapshot.download_time = Some(download_time.clone());
                snapshot.file_size = *file_size;
            }
            JobPhase::Failed { error, failed_at } => {
                snapshot.error = error.clone();
                snapshot.failed_at = Some(*failed_at);
            }
            JobPhase::Downloading { .. } | JobPhase::Processing => {}
        }
        snapshot
    }
}

/// Serializable projection of a [`JobRecord`]; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub message: String,
    #[serde(serialize_with = "epoch_secs")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "epoch_secs")]
    pub started_at: DateTime<Utc>,
    pub url: String,
    pub quality: Quality,
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
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "opt_epoch_secs"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "opt_epoch_secs"
    )]
    pub failed_at: Option<DateTime<Utc>>,
}

/// Unix time in fractional seconds.
pub fn to_epoch_secs(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_micros() as f64 / 1_000_000.0
}

/// Server-local `YYYY-MM-DD HH:MM:SS` rendering of a timestamp.
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(DATE_FORMAT).to_string()
}

/// `"12.3s"` style elapsed time between two instants.
pub fn format_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let secs = (to - from).num_milliseconds().max(0) as f64 / 1000.0;
    format!("{secs:.1}s")
}

pub(crate) fn epoch_secs<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(to_epoch_secs(*ts))
}

/// Whole seconds are written as integers, the way the extraction tool
/// reports them; fractional lengths stay floats.
fn duration_secs<S: Serializer>(secs: &f64, s: S) -> Result<S::Ok, S::Error> {
    if secs.fract() == 0.0 && secs.abs() < i64::MAX as f64 {
        s.serialize_i64(*secs as i64)
    } else {
        s.serialize_f64(*secs)
    }
}

pub(crate) fn opt_duration_secs<S: Serializer>(
    secs: &Option<f64>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match secs {
        Some(secs) => duration_secs(secs, s),
        None => s.serialize_none(),
    }
}

fn opt_epoch_secs<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => epoch_secs(ts, s),
        None => s.serialize_none(),
    }
}
