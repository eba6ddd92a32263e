//! Quiz synthesis.
//!
//! Builds the quiz-writing prompt from a [`Transcript`] and asks a
//! [`CompletionBackend`] for a JSON quiz. The reply is returned untouched as a
//! [`RawModelResponse`]; [`crate::validation`] decides whether it is usable.

mod backend;

pub use backend::{CompletionBackend, OpenAiBackend};

use crate::config::{OverflowPolicy, Prompts, SynthesisSettings};
use crate::error::{BackendFailure, QuizlyError, Result};
use crate::quiz::OPTIONS_PER_QUESTION;
use crate::transcription::Transcript;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Completion text exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse(String);

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Cap on how much transcript text is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptLimit {
    pub max_chars: usize,
    pub overflow: OverflowPolicy,
}

impl TranscriptLimit {
    pub fn from_settings(settings: &SynthesisSettings) -> Self {
        Self {
            max_chars: settings.max_transcript_chars,
            overflow: settings.overflow,
        }
    }

    /// Apply the limit to `text`, counting Unicode scalar values.
    pub fn apply<'a>(&self, text: &'a str) -> Result<Cow<'a, str>> {
        let Some((cut, _)) = text.char_indices().nth(self.max_chars) else {
            return Ok(Cow::Borrowed(text));
        };

        let actual = text.chars().count();
        match self.overflow {
            OverflowPolicy::Reject => Err(QuizlyError::InputTooLarge {
                actual,
                limit: self.max_chars,
            }),
            OverflowPolicy::Truncate => {
                warn!(
                    actual,
                    limit = self.max_chars,
                    "Transcript exceeds limit, truncating"
                );
                Ok(Cow::Owned(text[..cut].to_string()))
            }
        }
    }
}

/// Writes quizzes from transcripts.
pub struct QuizSynthesizer {
    backend: Arc<dyn CompletionBackend>,
    prompts: Prompts,
    limit: TranscriptLimit,
    question_count: usize,
    timeout: Duration,
}

impl QuizSynthesizer {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        prompts: Prompts,
        limit: TranscriptLimit,
        question_count: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            prompts,
            limit,
            question_count,
            timeout,
        }
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Render the system and user prompts for `transcript`.
    pub fn build_prompt(&self, transcript: &Transcript) -> Result<(String, String)> {
        let body = self.limit.apply(transcript.text())?;

        let title = if transcript.video_title().is_empty() {
            "(untitled)"
        } else {
            transcript.video_title()
        };

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("question_count".to_string(), self.question_count.to_string());
        vars.insert("option_count".to_string(), OPTIONS_PER_QUESTION.to_string());

        let system = self.prompts.render_with_custom(&self.prompts.quiz.system, &vars);
        // The transcript goes in last so text inside it is never treated as a placeholder.
        let user = self
            .prompts
            .render_with_custom(&self.prompts.quiz.user, &vars)
            .replace("{{transcript}}", &body);

        Ok((system, user))
    }

    /// Ask the backend for a quiz covering `transcript`.
    #[instrument(skip_all, fields(backend = self.backend.name(), chars = transcript.char_count()))]
    pub async fn synthesize(&self, transcript: &Transcript) -> Result<RawModelResponse> {
        let (system, user) = self.build_prompt(transcript)?;

        let text = tokio::time::timeout(self.timeout, self.backend.complete(&system, &user))
            .await
            .map_err(|_| {
                QuizlyError::synthesis(
                    BackendFailure::Timeout,
                    format!("no completion within {}s", self.timeout.as_secs_f64()),
                )
            })?
            .map_err(|e| match e {
                QuizlyError::Synthesis { .. } | QuizlyError::Config(_) => e,
                other => QuizlyError::synthesis(BackendFailure::Unavailable, other.to_string()),
            })?;

        if text.trim().is_empty() {
            return Err(QuizlyError::synthesis(
                BackendFailure::EmptyCompletion,
                "backend returned an empty completion",
            ));
        }

        info!(chars = text.len(), "Quiz completion received");
        Ok(RawModelResponse::new(text))
    }
}
