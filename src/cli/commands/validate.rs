//! Validate command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::QuizlyError;
use crate::validation::validate;
use anyhow::{Context, Result};

/// Run the validate command against a saved model response.
pub fn run_validate(file: &str, questions: Option<usize>, settings: &Settings) -> Result<()> {
    let path = Settings::expand_path(file);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let expected = questions.unwrap_or(settings.quiz.question_count);

    match validate(&raw, expected) {
        Ok(quiz) => {
            Output::success(&format!(
                "Valid quiz '{}' with {} questions",
                quiz.title(),
                quiz.question_count()
            ));
            Output::quiz_summary(&quiz);
            println!("{}", serde_json::to_string_pretty(&quiz)?);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::kv("kind", &e.kind().to_string());
            if let QuizlyError::SchemaViolation(violation) = &e {
                Output::kv("violation", &format!("{:?}", violation));
            }
            Err(e.into())
        }
    }
}
