//! Generative backends that write quizzes.

use crate::config::SynthesisSettings;
use crate::error::{BackendFailure, QuizlyError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// A text-completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Send one system + user prompt pair and return the completion text.
    ///
    /// Failures are reported as [`QuizlyError::Synthesis`].
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Chat completions over the OpenAI wire format.
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    json_mode: bool,
}

impl OpenAiBackend {
    pub fn from_settings(settings: &SynthesisSettings) -> Result<Self> {
        let client = create_client(
            settings.api_base.as_deref(),
            &settings.api_key_env,
            settings.timeout(),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            json_mode: settings.json_mode,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let build_err = |e: OpenAIError| QuizlyError::synthesis(BackendFailure::Request, e.to_string());

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(build_err)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(build_err)?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if self.json_mode {
            request.response_format(ResponseFormat::JsonObject);
        }
        let request = request.build().map_err(build_err)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let cause = classify_openai_error(&e);
            QuizlyError::synthesis(cause, format!("Failed to generate quiz: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }
}

/// Map a client error onto the failure classes callers branch on.
pub(crate) fn classify_openai_error(err: &OpenAIError) -> BackendFailure {
    match err {
        OpenAIError::Reqwest(e) if e.is_timeout() => BackendFailure::Timeout,
        OpenAIError::Reqwest(_) => BackendFailure::Unavailable,
        OpenAIError::ApiError(api) => classify_api_message(&api.to_string()),
        OpenAIError::InvalidArgument(_) => BackendFailure::Request,
        _ => BackendFailure::Unavailable,
    }
}

fn classify_api_message(message: &str) -> BackendFailure {
    let message = message.to_lowercase();
    if message.contains("insufficient_quota") || message.contains("quota") {
        BackendFailure::Quota
    } else if message.contains("invalid_api_key")
        || message.contains("api key")
        || message.contains("unauthorized")
        || message.contains("401")
        || message.contains("permission")
    {
        BackendFailure::Auth
    } else if message.contains("invalid_request") || message.contains("context_length") {
        BackendFailure::Request
    } else {
        BackendFailure::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::test_server::{self, QUOTA_EXCEEDED, RATE_LIMITED};
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn complete_against(body: &'static str, key_env: &str) -> (QuizlyError, usize) {
        let (base_url, hits) = test_server::serve(StatusCode::TOO_MANY_REQUESTS, body).await;
        std::env::set_var(key_env, "sk-test");
        let settings = SynthesisSettings {
            api_base: Some(base_url),
            api_key_env: key_env.into(),
            ..Default::default()
        };
        let backend = OpenAiBackend::from_settings(&settings).unwrap();

        let err = tokio::time::timeout(Duration::from_secs(10), backend.complete("system", "user"))
            .await
            .expect("rate-limited request should fail at once")
            .unwrap_err();
        (err, hits.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (err, hits) = complete_against(RATE_LIMITED, "QUIZLY_TEST_SYNTHESIS_KEY_RATE_LIMIT").await;

        assert_eq!(hits, 1);
        match err {
            QuizlyError::Synthesis { cause, message } => {
                assert_eq!(cause, BackendFailure::Unavailable);
                assert!(message.contains("Rate limit"), "{}", message);
            }
            other => panic!("expected a synthesis error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quota_is_reported_as_quota() {
        let (err, hits) = complete_against(QUOTA_EXCEEDED, "QUIZLY_TEST_SYNTHESIS_KEY_QUOTA").await;

        assert_eq!(hits, 1);
        assert!(matches!(
            err,
            QuizlyError::Synthesis {
                cause: BackendFailure::Quota,
                ..
            }
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_api_messages() {
        assert_eq!(
            classify_api_message("You exceeded your current quota, please check your plan"),
            BackendFailure::Quota
        );
        assert_eq!(
            classify_api_message("Incorrect API key provided: sk-****"),
            BackendFailure::Auth
        );
        assert_eq!(
            classify_api_message("invalid_request_error: context_length_exceeded"),
            BackendFailure::Request
        );
        assert_eq!(
            classify_api_message("The server had an error while processing your request"),
            BackendFailure::Unavailable
        );
    }

    #[test]
    fn test_invalid_argument_is_request_failure() {
        let err = OpenAIError::InvalidArgument("messages must not be empty".into());
        assert_eq!(classify_openai_error(&err), BackendFailure::Request);
    }

    #[test]
    fn test_requires_api_key() {
        let settings = SynthesisSettings {
            api_key_env: "QUIZLY_TEST_SYNTHESIS_KEY_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiBackend::from_settings(&settings),
            Err(QuizlyError::Config(_))
        ));
    }
}
