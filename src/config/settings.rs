//! Configuration settings for Quizly.

use crate::error::{QuizlyError, Result};
use crate::quiz::DEFAULT_QUESTION_COUNT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub acquisition: AcquisitionSettings,
    pub transcription: TranscriptionSettings,
    pub synthesis: SynthesisSettings,
    pub quiz: QuizSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for application data (local models live under `models/`).
    pub data_dir: String,
    /// Root under which every request gets its own scratch directory.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.quizly".to_string(),
            temp_dir: "/tmp/quizly".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Container format requested from the downloader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    M4a,
    Opus,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "m4a" => Some(AudioFormat::M4a),
            "opus" => Some(AudioFormat::Opus),
            _ => None,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Audio download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// yt-dlp executable name or path.
    pub ytdlp_binary: String,
    /// Audio format to extract.
    pub audio_format: AudioFormat,
    /// Maximum time for a single download, in seconds.
    pub timeout_secs: u64,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            ytdlp_binary: "yt-dlp".to_string(),
            audio_format: AudioFormat::Mp3,
            timeout_secs: 600,
        }
    }
}

impl AcquisitionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speech-to-text backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptionProvider {
    /// OpenAI-compatible transcription API (default).
    #[default]
    WhisperApi,
    /// whisper.cpp running in-process (requires the `local-whisper` feature).
    Local,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whisper-api" | "whisper" | "openai" => Ok(TranscriptionProvider::WhisperApi),
            "local" | "whisper-cpp" => Ok(TranscriptionProvider::Local),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::WhisperApi => write!(f, "whisper-api"),
            TranscriptionProvider::Local => write!(f, "local"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (whisper-api, local).
    pub provider: TranscriptionProvider,
    /// Model name for the API, or model size/variant for local inference (e.g. "base").
    pub model: String,
    /// Explicit path to a ggml model file for local inference.
    pub model_path: Option<String>,
    /// Alternative OpenAI-compatible API base URL.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Segment length used when a file is too large to upload at once, in seconds.
    pub chunk_duration_seconds: u32,
    /// HTTP timeout for a single transcription request, in seconds.
    pub timeout_secs: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::WhisperApi,
            model: "whisper-1".to_string(),
            model_path: None,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            chunk_duration_seconds: 600,
            timeout_secs: 300,
        }
    }
}

/// What to do with a transcript longer than the configured limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the first `max_transcript_chars` characters.
    #[default]
    Truncate,
    /// Fail with `InputTooLarge`.
    Reject,
}

/// Generative backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Chat model used to write the quiz.
    pub model: String,
    /// Alternative OpenAI-compatible API base URL (e.g. a Gemini endpoint).
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ask the backend for a JSON-only response.
    pub json_mode: bool,
    /// Transcript length limit in characters.
    pub max_transcript_chars: usize,
    /// Behaviour when the transcript exceeds the limit.
    pub overflow: OverflowPolicy,
    /// Maximum time for a single completion, in seconds.
    pub timeout_secs: u64,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.4,
            json_mode: true,
            max_transcript_chars: 60_000,
            overflow: OverflowPolicy::Truncate,
            timeout_secs: 120,
        }
    }
}

impl SynthesisSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Quiz shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Exact number of questions every quiz must have.
    pub question_count: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.quiz.question_count == 0 {
            return Err(QuizlyError::Config(
                "quiz.question_count must be at least 1".to_string(),
            ));
        }
        if self.synthesis.max_transcript_chars == 0 {
            return Err(QuizlyError::Config(
                "synthesis.max_transcript_chars must be at least 1".to_string(),
            ));
        }
        if self.acquisition.timeout_secs == 0 || self.synthesis.timeout_secs == 0 {
            return Err(QuizlyError::Config(
                "stage timeouts must be at least 1 second".to_string(),
            ));
        }
        if self.transcription.chunk_duration_seconds == 0 {
            return Err(QuizlyError::Config(
                "transcription.chunk_duration_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuizlyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizly")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Path of the local whisper.cpp model file.
    ///
    /// Defaults to `<data_dir>/models/ggml-<model>.bin`.
    pub fn local_model_path(&self) -> PathBuf {
        match &self.transcription.model_path {
            Some(path) => Self::expand_path(path),
            None => self
                .data_dir()
                .join("models")
                .join(format!("ggml-{}.bin", self.transcription.model)),
        }
    }
}
