//! CLI module for Quizly.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Quizly - Quizzes from YouTube videos
///
/// Downloads a video's audio, transcribes it and has a language model write
/// a multiple-choice quiz that is checked before it is printed.
#[derive(Parser, Debug)]
#[command(name = "quizly")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a quiz from a YouTube video
    Generate {
        /// YouTube video URL
        url: String,

        /// User the quiz is generated for (recorded in the output)
        #[arg(short, long, default_value = "anonymous")]
        user: String,

        /// Write the quiz JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Number of questions (overrides quiz.question_count)
        #[arg(short = 'n', long)]
        questions: Option<usize>,
    },

    /// Check a saved model response against the quiz schema
    Validate {
        /// File holding the raw model response
        file: String,

        /// Expected number of questions (overrides quiz.question_count)
        #[arg(short = 'n', long)]
        questions: Option<usize>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
