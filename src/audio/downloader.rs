//! Audio download via yt-dlp.

use crate::audio_source::VideoRequest;
use crate::config::{AcquisitionSettings, AudioFormat};
use crate::error::{QuizlyError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// File stem used for every download inside a scratch directory.
const AUDIO_STEM: &str = "audio";

/// Result of a successful download.
#[derive(Debug, Clone)]
pub struct DownloadedAudio {
    /// Location of the audio file inside the destination directory.
    pub path: PathBuf,
    /// Video title, empty when the backend could not report one.
    pub title: String,
}

/// Backend that fetches the audio track of a video into a directory.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download the audio for `request` into `dest_dir`.
    ///
    /// Implementations write only inside `dest_dir`; the caller removes the
    /// directory when the download fails.
    async fn download(&self, request: &VideoRequest, dest_dir: &Path) -> Result<DownloadedAudio>;
}

/// Downloads and extracts audio with yt-dlp (ffmpeg does the extraction).
pub struct YtDlpDownloader {
    binary: String,
    format: AudioFormat,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>, format: AudioFormat) -> Self {
        Self {
            binary: binary.into(),
            format,
        }
    }

    pub fn from_settings(settings: &AcquisitionSettings) -> Self {
        Self::new(&settings.ytdlp_binary, settings.audio_format)
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    #[instrument(skip(self, dest_dir), fields(video_id = %request.video_id()))]
    async fn download(&self, request: &VideoRequest, dest_dir: &Path) -> Result<DownloadedAudio> {
        let url = request.watch_url();
        info!("Downloading audio from {}", url);

        let template = dest_dir.join(format!("{}.%(ext)s", AUDIO_STEM));

        let result = Command::new(&self.binary)
            .arg("--extract-audio")
            .arg("--audio-format").arg(self.format.extension())
            .arg("--audio-quality").arg("0")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--no-progress")
            .arg("--no-warnings")
            .arg("--print").arg("after_move:filepath")
            .arg("--print").arg("after_move:title")
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizlyError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(QuizlyError::Acquisition(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuizlyError::Acquisition(format!(
                "yt-dlp failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (reported_path, title) = parse_print_output(&stdout);
        debug!(?reported_path, %title, "yt-dlp finished");

        let path = match reported_path.filter(|p| p.starts_with(dest_dir) && p.exists()) {
            Some(p) => p,
            None => find_audio_file(dest_dir)?,
        };

        Ok(DownloadedAudio { path, title })
    }
}

/// Split yt-dlp `--print` output into the file path and title lines.
fn parse_print_output(stdout: &str) -> (Option<PathBuf>, String) {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let path = lines.next().map(PathBuf::from);
    let title = lines.collect::<Vec<_>>().join(" ");
    // yt-dlp prints "NA" for fields it could not resolve.
    let title = if title == "NA" { String::new() } else { title };
    (path, title)
}

/// Locates the downloaded audio file inside `dir`.
fn find_audio_file(dir: &Path) -> Result<PathBuf> {
    for ext in &["mp3", "wav", "m4a", "opus", "webm", "ogg"] {
        let candidate = dir.join(format!("{}.{}", AUDIO_STEM, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| QuizlyError::Acquisition(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(AUDIO_STEM) && !name.ends_with(".part") {
            return Ok(entry.path());
        }
    }

    Err(QuizlyError::Acquisition(
        "Audio file not found after download".into(),
    ))
}
