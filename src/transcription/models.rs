//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// Text transcript of one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcribed speech, trimmed and never empty.
    text: String,
    /// Video title; empty when the download backend reported none.
    video_title: String,
}

impl Transcript {
    /// Build a transcript from backend output.
    ///
    /// Returns `None` if `text` contains nothing but whitespace.
    pub fn new(text: impl Into<String>, video_title: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            video_title: video_title.into().trim().to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    /// Length in characters (Unicode scalar values).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Join per-segment texts into one transcript body.
pub(crate) fn join_segments<I, S>(texts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
