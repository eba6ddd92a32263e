//! ffmpeg/ffprobe helpers used by the transcription backends.

use crate::error::{QuizlyError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Sample rate expected by whisper models.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Segments a long audio file into smaller chunks for upload.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns the chunk
/// paths in playback order; a short file is returned as-is.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = f64::from(chunk_seconds.max(1));

    if total_duration <= chunk_len {
        return Ok(vec![source.to_path_buf()]);
    }

    let extension = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp3");

    let mut segments = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("segment_{:04}.{}", idx, extension));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push(segment_path);

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding segment");

    let dest = dest.with_extension("mp3");
    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(&dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    check_ffmpeg(encode_result, "Segment extraction failed")
}

/// Decode `source` into 16 kHz mono 16-bit PCM WAV at `dest`.
pub async fn convert_to_wav(source: &Path, dest: &Path) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-ar").arg(WHISPER_SAMPLE_RATE.to_string())
        .arg("-ac").arg("1")
        .arg("-c:a").arg("pcm_s16le")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    check_ffmpeg(result, "Audio conversion failed")
}

fn check_ffmpeg(result: std::io::Result<std::process::Output>, context: &str) -> Result<()> {
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(QuizlyError::Transcription(format!("{context}: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizlyError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(QuizlyError::Transcription(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(QuizlyError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(QuizlyError::Transcription(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(QuizlyError::Transcription("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_duration(&json_str)
}

fn parse_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| QuizlyError::Transcription("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| QuizlyError::Transcription("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = r#"{"format": {"filename": "audio.mp3", "duration": "212.453000"}}"#;
        assert!((parse_duration(json).unwrap() - 212.453).abs() < 1e-9);

        assert!(parse_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_duration("not json").is_err());
        assert!(parse_duration(r#"{"format": {"duration": "N/A"}}"#).is_err());
    }
}
