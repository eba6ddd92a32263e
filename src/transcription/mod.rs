//! Transcription module for Quizly.
//!
//! Converts a downloaded audio file into a [`Transcript`].
//!
//! # Backends
//!
//! - **whisper-api** (default): any OpenAI-compatible `/audio/transcriptions`
//!   endpoint. Files too large for one upload are split with ffmpeg.
//! - **local**: whisper.cpp in-process, enabled by the `local-whisper` feature.
//!
//! The backend is expensive to set up (HTTP client, or a model loaded into
//! memory), so the process keeps one instance in [`shared_transcriber`].

#[cfg(feature = "local-whisper")]
mod local;
mod models;
mod whisper;

#[cfg(feature = "local-whisper")]
pub use local::LocalWhisperTranscriber;
pub use models::Transcript;
pub use whisper::WhisperTranscriber;

use crate::audio::AudioArtifact;
use crate::config::{Settings, TranscriptionProvider};
use crate::error::{QuizlyError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Transcribe an audio file and return the spoken text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

static SHARED: OnceCell<Arc<dyn Transcriber>> = OnceCell::const_new();

/// The process-wide transcriber, created from `settings` on first use.
///
/// Later calls return the same instance regardless of `settings`. If
/// creation fails the cell stays empty and the next call tries again.
pub async fn shared_transcriber(settings: &Settings) -> Result<Arc<dyn Transcriber>> {
    SHARED
        .get_or_try_init(|| async { create_transcriber(settings) })
        .await
        .map(Arc::clone)
}

/// Create a new transcriber for the configured provider.
pub fn create_transcriber(settings: &Settings) -> Result<Arc<dyn Transcriber>> {
    match settings.transcription.provider {
        TranscriptionProvider::WhisperApi => {
            info!("Using Whisper API transcription ({})", settings.transcription.model);
            Ok(Arc::new(WhisperTranscriber::from_settings(&settings.transcription)?))
        }
        #[cfg(feature = "local-whisper")]
        TranscriptionProvider::Local => {
            let transcriber = LocalWhisperTranscriber::load(&settings.local_model_path())?;
            Ok(Arc::new(transcriber))
        }
        #[cfg(not(feature = "local-whisper"))]
        TranscriptionProvider::Local => Err(QuizlyError::Config(
            "Local transcription requires building with --features local-whisper".into(),
        )),
    }
}

/// Transcribe the audio held by `artifact`.
///
/// Fails with [`QuizlyError::Transcription`] when the file is missing or
/// empty, when the backend fails, or when it returns only whitespace.
/// Missing tools and configuration problems keep their own kind.
#[instrument(skip_all, fields(backend = transcriber.name(), audio_path = %artifact.path().display()))]
pub async fn transcribe_artifact(
    transcriber: &dyn Transcriber,
    artifact: &AudioArtifact,
) -> Result<Transcript> {
    let path = artifact.path();
    let metadata = std::fs::metadata(path).map_err(|e| {
        QuizlyError::Transcription(format!("Cannot read audio file {}: {}", path.display(), e))
    })?;
    if metadata.len() == 0 {
        return Err(QuizlyError::Transcription(format!(
            "Audio file {} is empty",
            path.display()
        )));
    }

    let text = transcriber.transcribe(path).await.map_err(|e| match e {
        QuizlyError::Transcription(_) | QuizlyError::ToolNotFound(_) | QuizlyError::Config(_) => e,
        other => QuizlyError::Transcription(other.to_string()),
    })?;

    let transcript = Transcript::new(text, artifact.title())
        .ok_or_else(|| QuizlyError::Transcription("Backend returned an empty transcript".into()))?;

    info!(chars = transcript.char_count(), "Transcription complete");
    Ok(transcript)
}
