//! Audio acquisition.
//!
//! [`AudioAcquirer`] turns a video URL into an [`AudioArtifact`]: a local
//! audio file inside a per-request scratch directory that is removed when
//! the artifact is released or dropped. On failure nothing is left behind.

mod artifact;
mod downloader;
pub mod ffmpeg;

pub use artifact::AudioArtifact;
pub use downloader::{AudioDownloader, DownloadedAudio, YtDlpDownloader};

use crate::audio_source::VideoRequest;
use crate::config::{AudioFormat, Settings};
use crate::error::{QuizlyError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Downloads audio for a video into an isolated scratch directory.
pub struct AudioAcquirer {
    downloader: Arc<dyn AudioDownloader>,
    temp_root: PathBuf,
    default_format: AudioFormat,
    timeout: Duration,
}

impl AudioAcquirer {
    pub fn new(
        downloader: Arc<dyn AudioDownloader>,
        temp_root: impl Into<PathBuf>,
        default_format: AudioFormat,
        timeout: Duration,
    ) -> Self {
        Self {
            downloader,
            temp_root: temp_root.into(),
            default_format,
            timeout,
        }
    }

    /// Acquirer backed by yt-dlp, configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(YtDlpDownloader::from_settings(&settings.acquisition)),
            settings.temp_dir(),
            settings.acquisition.audio_format,
            settings.acquisition.timeout(),
        )
    }

    pub fn temp_root(&self) -> &std::path::Path {
        &self.temp_root
    }

    /// Download the audio track of the video at `url`.
    ///
    /// The URL is checked before anything touches the network or the disk.
    /// Each call gets its own scratch directory, so concurrent acquisitions
    /// never share files.
    #[instrument(skip(self))]
    pub async fn acquire(&self, url: &str) -> Result<AudioArtifact> {
        let request = VideoRequest::parse(url)?;

        std::fs::create_dir_all(&self.temp_root)?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("quizly-{}-", uuid::Uuid::new_v4().simple()))
            .tempdir_in(&self.temp_root)?;
        debug!(dir = %scratch.path().display(), "Created scratch directory");

        match self.download_into(&request, &scratch).await {
            Ok(downloaded) => {
                let format = downloaded
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(AudioFormat::from_extension)
                    .unwrap_or(self.default_format);

                info!(
                    video_id = %request.video_id(),
                    path = %downloaded.path.display(),
                    "Audio acquired"
                );
                Ok(AudioArtifact::new(scratch, downloaded.path, format, downloaded.title))
            }
            Err(e) => {
                let dir = scratch.path().to_path_buf();
                if let Err(close_err) = scratch.close() {
                    warn!(
                        "Failed to remove scratch directory {}: {}",
                        dir.display(),
                        close_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn download_into(
        &self,
        request: &VideoRequest,
        scratch: &TempDir,
    ) -> Result<DownloadedAudio> {
        let downloaded = tokio::time::timeout(
            self.timeout,
            self.downloader.download(request, scratch.path()),
        )
        .await
        .map_err(|_| {
            QuizlyError::Acquisition(format!(
                "download timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        })??;

        if !downloaded.path.starts_with(scratch.path()) {
            return Err(QuizlyError::Acquisition(format!(
                "downloader wrote outside its scratch directory: {}",
                downloaded.path.display()
            )));
        }

        let metadata = std::fs::metadata(&downloaded.path).map_err(|e| {
            QuizlyError::Acquisition(format!(
                "downloaded file {} is missing: {}",
                downloaded.path.display(),
                e
            ))
        })?;
        if metadata.len() == 0 {
            return Err(QuizlyError::Acquisition("downloaded file is empty".into()));
        }

        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Succeed,
        PartialThenFail,
        Hang,
        EmptyFile,
    }

    struct FakeDownloader {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeDownloader {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AudioDownloader for FakeDownloader {
        async fn download(&self, _request: &VideoRequest, dest_dir: &Path) -> Result<DownloadedAudio> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = dest_dir.join("audio.m4a");
            match self.behavior {
                Behavior::Succeed => {
                    std::fs::write(&path, b"fake audio")?;
                    Ok(DownloadedAudio {
                        path,
                        title: "Fake Video".into(),
                    })
                }
                Behavior::PartialThenFail => {
                    std::fs::write(dest_dir.join("audio.m4a.part"), b"half")?;
                    Err(QuizlyError::Acquisition("HTTP Error 403: Forbidden".into()))
                }
                Behavior::Hang => {
                    std::fs::write(dest_dir.join("audio.m4a.part"), b"half")?;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    unreachable!("the acquirer times out first")
                }
                Behavior::EmptyFile => {
                    std::fs::write(&path, b"")?;
                    Ok(DownloadedAudio {
                        path,
                        title: String::new(),
                    })
                }
            }
        }
    }

    fn acquirer(downloader: Arc<FakeDownloader>, root: &Path, timeout: Duration) -> AudioAcquirer {
        AudioAcquirer::new(downloader, root.join("quizly"), AudioFormat::Mp3, timeout)
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_acquire_success() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::Succeed);
        let acquirer = acquirer(fake.clone(), root.path(), Duration::from_secs(5));

        let artifact = acquirer.acquire(URL).await.unwrap();
        assert!(artifact.path().exists());
        assert_eq!(artifact.format(), AudioFormat::M4a);
        assert_eq!(artifact.title(), "Fake Video");
        assert!(artifact.path().starts_with(acquirer.temp_root()));

        artifact.release().unwrap();
        assert_eq!(entries(acquirer.temp_root()), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_never_downloads() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::Succeed);
        let acquirer = acquirer(fake.clone(), root.path(), Duration::from_secs(5));

        let err = acquirer.acquire("not-a-url").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSource);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
        assert!(!acquirer.temp_root().exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::PartialThenFail);
        let acquirer = acquirer(fake, root.path(), Duration::from_secs(5));

        let err = acquirer.acquire(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert!(err.is_retryable());
        assert_eq!(entries(acquirer.temp_root()), 0);
    }

    #[tokio::test]
    async fn test_download_timeout() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::Hang);
        let acquirer = acquirer(fake, root.path(), Duration::from_millis(50));

        let err = acquirer.acquire(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert!(err.to_string().contains("timed out"));
        assert_eq!(entries(acquirer.temp_root()), 0);
    }

    #[tokio::test]
    async fn test_empty_download_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::EmptyFile);
        let acquirer = acquirer(fake, root.path(), Duration::from_secs(5));

        let err = acquirer.acquire(URL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert_eq!(entries(acquirer.temp_root()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_acquisitions_are_isolated() {
        let root = tempfile::tempdir().unwrap();
        let fake = FakeDownloader::new(Behavior::Succeed);
        let acquirer = acquirer(fake, root.path(), Duration::from_secs(5));

        let (a, b) = tokio::join!(acquirer.acquire(URL), acquirer.acquire(URL));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.scratch_dir(), b.scratch_dir());
        assert_eq!(entries(acquirer.temp_root()), 2);

        a.release().unwrap();
        assert!(b.path().exists());
        b.release().unwrap();
        assert_eq!(entries(acquirer.temp_root()), 0);
    }
}
