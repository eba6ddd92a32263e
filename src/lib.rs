//! Quizly - Quizzes from YouTube videos
//!
//! Turns a YouTube URL into a validated multiple-choice quiz.
//!
//! # Overview
//!
//! For each request Quizly:
//! - Downloads the audio track into a private scratch directory
//! - Transcribes it with Whisper (API or local whisper.cpp)
//! - Asks a chat model to write a quiz from the transcript
//! - Checks the reply strictly before handing back a typed quiz
//! - Removes the downloaded audio, whatever the outcome
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `audio_source` - YouTube URL recognition
//! - `audio` - Audio download and scratch directory ownership
//! - `transcription` - Speech-to-text transcription
//! - `synthesis` - Prompting the generative backend
//! - `validation` - JSON extraction and quiz schema checks
//! - `quiz` - Validated quiz types
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use quizly::config::Settings;
//! use quizly::orchestrator::QuizPipeline;
//! use quizly::quiz::PersistedQuiz;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = QuizPipeline::new(&settings).await?;
//!
//!     let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
//!     let quiz = pipeline.generate_quiz(url, "alice").await?;
//!     let record = PersistedQuiz::new(quiz, "alice", url);
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod audio_source;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod quiz;
pub mod synthesis;
pub mod transcription;
pub mod validation;

pub use error::{ErrorKind, QuizlyError, Result};
