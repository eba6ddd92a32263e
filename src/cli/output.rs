//! CLI output formatting utilities.

use crate::quiz::QuizDraft;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        eprintln!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        eprintln!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        eprintln!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        eprintln!("  {}: {}", style(key).dim(), value);
    }

    /// Print a human-readable summary of a quiz.
    pub fn quiz_summary(quiz: &QuizDraft) {
        eprintln!("\n{}", style(quiz.title()).bold());
        if !quiz.description().is_empty() {
            eprintln!("{}", style(quiz.description()).dim());
        }
        for (i, question) in quiz.questions().iter().enumerate() {
            eprintln!("\n  {}. {}", i + 1, question.question_text());
            for option in question.options() {
                let marker = if option == question.correct_option() {
                    style("*").green().bold()
                } else {
                    style("-").dim()
                };
                eprintln!("     {} {}", marker, option);
            }
        }
        eprintln!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
