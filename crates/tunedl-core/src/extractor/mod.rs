//! Seam to the external media extraction tool.
//!
//! The worker only ever talks to [`Extractor`]; [`ytdlp::YtDlpExtractor`] is
//! the production implementation.

pub mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::job::{MediaMetadata, Quality};

pub use ytdlp::YtDlpExtractor;

/// Target codec for every transcode.
pub const AUDIO_CODEC: &str = "mp3";

/// Format/codec choices derived from a [`Quality`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProfile {
    pub format_selector: &'static str,
    pub audio_codec: &'static str,
    pub bitrate_kbps: u32,
}

impl From<Quality> for FormatProfile {
    fn from(quality: Quality) -> Self {
        Self {
            format_selector: quality.format_selector(),
            audio_codec: AUDIO_CODEC,
            bitrate_kbps: quality.audio_bitrate_kbps(),
        }
    }
}

/// Metadata as reported by the tool. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    /// Channel or uploader name, reported as the artist.
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl MediaInfo {
    /// Fill in the defaults used when the tool omits a field.
    pub fn into_metadata(self) -> MediaMetadata {
        MediaMetadata {
            title: self.title.unwrap_or_else(|| "Audio".to_owned()),
            artist: self.uploader.unwrap_or_else(|| "Unknown".to_owned()),
            duration: self.duration.unwrap_or(0.0),
        }
    }
}

/// Result of a finished download + transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: Option<PathBuf>,
    pub size: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extractor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("invalid extractor output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches media metadata and performs the download/transcode.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Describe the media at `url` without downloading it.
    async fn fetch_info(&self, url: &str, profile: &FormatProfile)
    -> Result<MediaInfo, ExtractError>;

    /// Download and transcode the media at `url` into `output_dir`.
    async fn download(
        &self,
        url: &str,
        profile: &FormatProfile,
        output_dir: &Path,
    ) -> Result<DownloadedFile, ExtractError>;
}
