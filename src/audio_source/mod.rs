//! Video source recognition for Quizly.
//!
//! Turns a user-supplied URL into a [`VideoRequest`] before any network
//! activity happens.

mod youtube;

pub use youtube::YoutubeSource;

use crate::error::Result;

/// A recognized request to turn one video into a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    url: String,
    video_id: String,
}

impl VideoRequest {
    /// Parse a video URL. See [`YoutubeSource::parse`].
    pub fn parse(input: &str) -> Result<Self> {
        YoutubeSource.parse(input)
    }

    /// The URL as supplied (trimmed).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The 11-character YouTube video ID.
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Canonical watch URL for the video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}
