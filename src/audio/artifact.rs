//! Scoped ownership of a downloaded audio file.

use crate::config::AudioFormat;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A downloaded audio file and the per-request scratch directory holding it.
///
/// The artifact owns the directory: [`AudioArtifact::release`] removes it and
/// reports failures, and dropping the artifact without releasing it removes
/// it as well (on unwinding or when the owning future is cancelled).
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    format: AudioFormat,
    title: String,
    scratch: Option<TempDir>,
}

impl AudioArtifact {
    /// Wrap `path`, which must live inside `scratch`.
    pub fn new(
        scratch: TempDir,
        path: PathBuf,
        format: AudioFormat,
        title: impl Into<String>,
    ) -> Self {
        debug_assert!(path.starts_with(scratch.path()));
        Self {
            path,
            format,
            title: title.into(),
            scratch: Some(scratch),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Video title reported by the download backend. May be empty.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The scratch directory that holds the audio and any derived files.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// Delete the audio file and its scratch directory.
    pub fn release(mut self) -> std::io::Result<()> {
        match self.scratch.take() {
            Some(dir) => {
                debug!(dir = %dir.path().display(), "Removing scratch directory");
                dir.close()
            }
            None => Ok(()),
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        if let Some(dir) = self.scratch.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch directory {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_in(root: &Path) -> AudioArtifact {
        let scratch = tempfile::Builder::new()
            .prefix("quizly-test-")
            .tempdir_in(root)
            .unwrap();
        let path = scratch.path().join("audio.mp3");
        std::fs::write(&path, b"ID3").unwrap();
        AudioArtifact::new(scratch, path, AudioFormat::Mp3, "Title")
    }

    #[test]
    fn test_release_removes_file_and_directory() {
        let root = tempfile::tempdir().unwrap();
        let artifact = artifact_in(root.path());
        let path = artifact.path().to_path_buf();
        let dir = artifact.scratch_dir().unwrap().to_path_buf();
        assert!(path.exists());

        artifact.release().unwrap();
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let artifact = artifact_in(root.path());
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwinding_removes_file() {
        let root = tempfile::tempdir().unwrap();
        let artifact = artifact_in(root.path());
        let path = artifact.path().to_path_buf();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _owned = artifact;
            panic!("stage blew up");
        }));

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
