//! OpenAI-compatible client configuration.
//!
//! Both the transcription API and the quiz-writing chat backend speak the
//! OpenAI wire format, so any compatible endpoint can be configured through
//! `api_base` (Gemini, a local proxy, ...).

use crate::error::{QuizlyError, Result};
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

/// Create a client for the given endpoint and credentials.
///
/// The API key is read from the environment variable named by `api_key_env`.
/// `timeout` bounds every HTTP request made by the client. Rate-limited
/// requests are not retried; the first failure goes back to the caller.
pub fn create_client(
    api_base: Option<&str>,
    api_key_env: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            QuizlyError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                api_key_env, api_key_env
            ))
        })?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| QuizlyError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let no_retry = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry))
}

/// Check whether the environment variable `api_key_env` holds a non-empty value.
pub fn is_api_key_configured(api_key_env: &str) -> bool {
    std::env::var(api_key_env).is_ok_and(|k| !k.trim().is_empty())
}
