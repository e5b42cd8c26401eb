use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{DownloadedFile, ExtractError, Extractor, FormatProfile, MediaInfo};

pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

/// Output template relative to the download directory.
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// [`Extractor`] backed by the `yt-dlp` executable.
///
/// No timeout wraps the child process; yt-dlp's own socket timeouts apply.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary_path: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_YTDLP_PATH)
    }
}

impl YtDlpExtractor {
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            ffmpeg_location: None,
        }
    }

    /// Point yt-dlp at a specific ffmpeg binary or directory.
    pub fn with_ffmpeg_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.ffmpeg_location = Some(location.into());
        self
    }

    /// Best-effort check that the binary can be launched.
    pub async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.binary_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|s| s.success())
    }

    fn info_args(url: &str, profile: &FormatProfile) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--no-playlist",
            "--no-warnings",
            "-f",
            profile.format_selector,
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn download_args(&self, url: &str, profile: &FormatProfile, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--no-playlist",
            "--no-warnings",
            "--no-progress",
            "-f",
            profile.format_selector,
            "--extract-audio",
            "--audio-format",
            profile.audio_codec,
            "--audio-quality",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(format!("{}K", profile.bitrate_kbps).into());
        args.push("-o".into());
        args.push(output_dir.join(OUTPUT_TEMPLATE).into_os_string());
        args.push("--print".into());
        args.push("after_move:filepath".into());
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }
        args.push(url.into());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Output, ExtractError> {
        debug!(program = %self.binary_path.display(), ?args, "spawning extractor");
        let output = tokio::process::Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExtractError::Spawn {
                program: self.binary_path.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(ExtractError::Failed {
                status: output.status.to_string(),
                stderr: last_line(&output.stderr)
                    .unwrap_or_else(|| "no diagnostic output".to_owned()),
            })
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn fetch_info(
        &self,
        url: &str,
        profile: &FormatProfile,
    ) -> Result<MediaInfo, ExtractError> {
        let output = self.run(Self::info_args(url, profile)).await?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    async fn download(
        &self,
        url: &str,
        profile: &FormatProfile,
        output_dir: &Path,
    ) -> Result<DownloadedFile, ExtractError> {
        let output = self
            .run(self.download_args(url, profile, output_dir))
            .await?;

        let path = last_line(&output.stdout).map(PathBuf::from);
        let size = match &path {
            Some(p) => tokio::fs::metadata(p).await.ok().map(|m| m.len()),
            None => None,
        };
        info!(url, path = ?path, size = ?size, "extractor finished download");
        Ok(DownloadedFile { path, size })
    }
}

/// Last non-empty line of a process stream, trimmed.
fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .map(str::to_owned)
}
