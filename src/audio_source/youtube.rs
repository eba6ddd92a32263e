//! YouTube URL recognition.

use super::VideoRequest;
use crate::error::{QuizlyError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Hosts that serve YouTube watch pages.
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

/// Short-link host.
const SHORT_HOST: &str = "youtu.be";

/// Path prefixes that carry the video ID as the next path segment.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex"));

/// Recognizes YouTube video URLs without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubeSource;

impl YoutubeSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse `input` into a [`VideoRequest`].
    ///
    /// Fails with [`QuizlyError::InvalidSource`] unless `input` is an http(s)
    /// URL on a YouTube host that points at a single video.
    pub fn parse(&self, input: &str) -> Result<VideoRequest> {
        let trimmed = input.trim();
        let invalid = |reason: &str| {
            QuizlyError::InvalidSource(format!("{} ({:?})", reason, trimmed))
        };

        let url = Url::parse(trimmed).map_err(|_| invalid("not a URL"))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("URL scheme must be http or https"));
        }

        let host = url
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| invalid("URL has no host"))?;

        let video_id = if host == SHORT_HOST {
            first_segment(&url)
        } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
            self.id_from_watch_url(&url)
        } else {
            return Err(invalid("not a YouTube URL"));
        };

        let video_id = video_id
            .filter(|id| VIDEO_ID.is_match(id))
            .ok_or_else(|| invalid("URL does not point at a YouTube video"))?;

        Ok(VideoRequest {
            url: trimmed.to_string(),
            video_id,
        })
    }

    /// Check whether `input` is a recognized video URL.
    pub fn can_handle(&self, input: &str) -> bool {
        self.parse(input).is_ok()
    }

    fn id_from_watch_url(&self, url: &Url) -> Option<String> {
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            prefix if ID_PATH_PREFIXES.contains(&prefix) => segments.next().map(str::to_string),
            _ => None,
        }
    }
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn video_id(input: &str) -> Option<String> {
        YoutubeSource::new()
            .parse(input)
            .ok()
            .map(|r| r.video_id().to_string())
    }

    #[test]
    fn test_extract_video_id() {
        let id = Some("dQw4w9WgXcQ".to_string());

        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"), id);
        assert_eq!(video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://music.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://www.youtube.com/v/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("http://WWW.YOUTUBE.COM/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("  https://youtu.be/dQw4w9WgXcQ  "), id);
    }

    #[test]
    fn test_rejects_non_video_inputs() {
        let source = YoutubeSource::new();

        for input in [
            "not-a-url",
            "",
            "dQw4w9WgXcQ",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://vimeo.com/123456",
            "https://youtube.com.evil.example/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/playlist?list=PLtest",
            "https://www.youtube.com/@channel",
            "https://youtu.be/",
        ] {
            let err = source.parse(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidSource, "input: {:?}", input);
        }
    }

    #[test]
    fn test_can_handle() {
        let source = YoutubeSource::new();
        assert!(source.can_handle("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!source.can_handle("/path/to/video.mp4"));
    }

    #[test]
    fn test_sources_share_one_pattern() {
        let first = YoutubeSource::new();
        let second = YoutubeSource::default();
        assert!(first.can_handle("https://youtu.be/dQw4w9WgXcQ"));
        assert!(second.can_handle("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(std::mem::size_of::<YoutubeSource>(), 0);
    }

    #[test]
    fn test_watch_url() {
        let request = YoutubeSource::new()
            .parse("https://youtu.be/dQw4w9WgXcQ")
            .unwrap();
        assert_eq!(request.url(), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            request.watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
