//! Pipeline orchestrator for Quizly.
//!
//! Runs one request from video URL to validated quiz:
//! acquire audio, transcribe, synthesize, validate. Stages run in order and
//! the first failure ends the request. The downloaded audio is removed on
//! every exit path.

use crate::audio::{AudioAcquirer, AudioArtifact, AudioDownloader};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::quiz::QuizDraft;
use crate::synthesis::{CompletionBackend, OpenAiBackend, QuizSynthesizer, TranscriptLimit};
use crate::transcription::{shared_transcriber, transcribe_artifact, Transcriber};
use crate::validation::validate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The quiz generation pipeline.
///
/// A pipeline holds no per-request state, so one instance can serve any
/// number of concurrent requests.
pub struct QuizPipeline {
    acquirer: AudioAcquirer,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: QuizSynthesizer,
    question_count: usize,
}

impl QuizPipeline {
    /// Create a pipeline with the backends configured in `settings`.
    pub async fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber = shared_transcriber(settings).await?;
        let backend = Arc::new(OpenAiBackend::from_settings(&settings.synthesis)?);
        info!(model = %settings.synthesis.model, "Using chat model for quiz synthesis");

        Ok(Self::assemble(
            settings,
            prompts,
            AudioAcquirer::from_settings(settings),
            transcriber,
            backend,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        downloader: Arc<dyn AudioDownloader>,
        transcriber: Arc<dyn Transcriber>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let acquirer = AudioAcquirer::new(
            downloader,
            settings.temp_dir(),
            settings.acquisition.audio_format,
            settings.acquisition.timeout(),
        );
        Self::assemble(settings, prompts, acquirer, transcriber, backend)
    }

    fn assemble(
        settings: &Settings,
        prompts: Prompts,
        acquirer: AudioAcquirer,
        transcriber: Arc<dyn Transcriber>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let question_count = settings.quiz.question_count;
        let synthesizer = QuizSynthesizer::new(
            backend,
            prompts,
            TranscriptLimit::from_settings(&settings.synthesis),
            question_count,
            settings.synthesis.timeout(),
        );

        Self {
            acquirer,
            transcriber,
            synthesizer,
            question_count,
        }
    }

    /// Number of questions every generated quiz has.
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Generate a validated quiz for the video at `url`.
    ///
    /// `requesting_user` is only recorded in logs; wrap the result with
    /// [`crate::quiz::PersistedQuiz::new`] to attach ownership.
    #[instrument(skip(self), fields(request_id = %uuid::Uuid::new_v4().simple()))]
    pub async fn generate_quiz(&self, url: &str, requesting_user: &str) -> Result<QuizDraft> {
        let artifact = self.acquirer.acquire(url).await?;

        let outcome = self.process(&artifact).await;

        if let Err(e) = artifact.release() {
            warn!("Failed to remove downloaded audio: {}", e);
        }

        match &outcome {
            Ok(quiz) => info!(
                title = %quiz.title(),
                questions = quiz.question_count(),
                "Quiz generated"
            ),
            Err(e) => warn!(kind = %e.kind(), retryable = e.is_retryable(), "Quiz generation failed: {}", e),
        }

        outcome
    }

    async fn process(&self, artifact: &AudioArtifact) -> Result<QuizDraft> {
        let transcript = transcribe_artifact(self.transcriber.as_ref(), artifact).await?;
        let raw = self.synthesizer.synthesize(&transcript).await?;
        validate(raw.as_str(), self.question_count)
    }
}
