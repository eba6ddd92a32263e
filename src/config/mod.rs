//! Configuration module for Quizly.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuizPrompts};
pub use settings::{
    AcquisitionSettings, AudioFormat, GeneralSettings, OverflowPolicy, PromptSettings,
    QuizSettings, Settings, SynthesisSettings, TranscriptionProvider, TranscriptionSettings,
};
