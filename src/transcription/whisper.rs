//! OpenAI Whisper transcription implementation.

use super::{models::join_segments, Transcriber};
use crate::audio::ffmpeg::split_audio;
use crate::config::TranscriptionSettings;
use crate::error::{QuizlyError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Largest file the transcription endpoint accepts in one upload.
const MAX_UPLOAD_BYTES: u64 = 24 * 1024 * 1024;

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
}

impl WhisperTranscriber {
    /// Create a transcriber for the endpoint configured in `settings`.
    pub fn from_settings(settings: &TranscriptionSettings) -> Result<Self> {
        let client = create_client(
            settings.api_base.as_deref(),
            &settings.api_key_env,
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            chunk_duration_seconds: settings.chunk_duration_seconds,
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            QuizlyError::Transcription(format!("Cannot read {}: {}", audio_path.display(), e))
        })?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| QuizlyError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| QuizlyError::Transcription(format!("Whisper API error: {}", e)))?;

        debug!(duration = response.duration, "Segment transcribed");
        Ok(response.text)
    }

    /// Transcribe an audio file, splitting it first if it is too large to upload.
    ///
    /// Segments are written next to the source file so they share its
    /// scratch directory, and are transcribed one after another.
    async fn transcribe_with_splitting(&self, audio_path: &Path) -> Result<String> {
        let size = std::fs::metadata(audio_path)?.len();
        if size <= MAX_UPLOAD_BYTES {
            return self.transcribe_single(audio_path).await;
        }

        let parent = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let segment_dir = tempfile::Builder::new()
            .prefix("segments-")
            .tempdir_in(parent)?;
        let chunks = split_audio(audio_path, segment_dir.path(), self.chunk_duration_seconds).await?;

        info!("Processing {} audio chunks with {}", chunks.len(), self.model);

        let mut texts = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let text = self.transcribe_single(chunk).await.map_err(|e| {
                QuizlyError::Transcription(format!("Chunk {} failed: {}", idx, e))
            })?;
            texts.push(text);
        }

        Ok(join_segments(texts))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper-api"
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        self.transcribe_with_splitting(audio_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::test_server::{self, RATE_LIMITED};
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (base_url, hits) = test_server::serve(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED).await;
        std::env::set_var("QUIZLY_TEST_WHISPER_KEY_RATE_LIMIT", "sk-test");
        let settings = TranscriptionSettings {
            api_base: Some(base_url),
            api_key_env: "QUIZLY_TEST_WHISPER_KEY_RATE_LIMIT".into(),
            ..Default::default()
        };
        let transcriber = WhisperTranscriber::from_settings(&settings).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.mp3");
        std::fs::write(&audio, b"ID3 not really audio").unwrap();

        let err = tokio::time::timeout(Duration::from_secs(10), transcriber.transcribe(&audio))
            .await
            .expect("rate-limited request should fail at once")
            .unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(matches!(err, QuizlyError::Transcription(_)));
    }

    #[test]
    fn test_requires_api_key() {
        let settings = TranscriptionSettings {
            api_key_env: "QUIZLY_TEST_WHISPER_KEY_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            WhisperTranscriber::from_settings(&settings),
            Err(QuizlyError::Config(_))
        ));
    }
}
