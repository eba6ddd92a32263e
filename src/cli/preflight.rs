//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a generation run that would otherwise fail midway.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{QuizlyError, Result};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generation needs the download tools and backend credentials.
    Generate,
    /// Validating a saved response has no external requirements.
    Validate,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Generate => {
            check_tool(&settings.acquisition.ytdlp_binary)?;
            check_tool("ffmpeg")?;
            match settings.transcription.provider {
                TranscriptionProvider::WhisperApi => {
                    check_tool("ffprobe")?;
                    check_api_key(&settings.transcription.api_key_env)?;
                }
                TranscriptionProvider::Local => {
                    let model = settings.local_model_path();
                    if !model.is_file() {
                        return Err(QuizlyError::Config(format!(
                            "Whisper model not found at {}",
                            model.display()
                        )));
                    }
                }
            }
            check_api_key(&settings.synthesis.api_key_env)?;
        }
        Operation::Validate => {}
    }
    Ok(())
}

fn check_api_key(env: &str) -> Result<()> {
    if is_api_key_configured(env) {
        Ok(())
    } else {
        Err(QuizlyError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            env, env
        )))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(QuizlyError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizlyError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(QuizlyError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_validate_no_requirements() {
        assert!(check(Operation::Validate, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        let mut settings = Settings::default();
        settings.acquisition.ytdlp_binary = "quizly-no-such-downloader".into();
        assert!(matches!(
            check(Operation::Generate, &settings),
            Err(QuizlyError::ToolNotFound(_))
        ));
    }
}
