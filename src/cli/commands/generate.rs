//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::QuizPipeline;
use crate::quiz::PersistedQuiz;
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(
    url: &str,
    user: &str,
    output: Option<String>,
    questions: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(n) = questions {
        settings.quiz.question_count = n;
    }
    settings.validate()?;

    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'quizly doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Processing: {}", url));

    let pipeline = QuizPipeline::new(&settings).await?;

    let spinner = Output::spinner("Downloading, transcribing and writing quiz...");
    let result = pipeline.generate_quiz(url, user).await;
    spinner.finish_and_clear();

    let quiz = match result {
        Ok(quiz) => quiz,
        Err(e) => {
            Output::error(&format!("{}", e));
            if e.is_retryable() {
                Output::info("This failure may be temporary; running the command again may succeed.");
            }
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Generated '{}' ({} questions)",
        quiz.title(),
        quiz.question_count()
    ));

    let record = PersistedQuiz::new(quiz, user, url);
    let json = serde_json::to_string_pretty(&record)?;

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)?;
            Output::quiz_summary(&record.quiz);
            Output::success(&format!("Quiz written to {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}
