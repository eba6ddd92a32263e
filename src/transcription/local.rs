//! In-process transcription with whisper.cpp.

use super::{models::join_segments, Transcriber};
use crate::audio::ffmpeg::{convert_to_wav, WHISPER_SAMPLE_RATE};
use crate::error::{QuizlyError, Result};
use async_trait::async_trait;
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Transcriber backed by a whisper.cpp model loaded once per process.
///
/// The context is shared by every request; inference runs on the blocking
/// pool one call at a time.
pub struct LocalWhisperTranscriber {
    ctx: Arc<Mutex<WhisperContext>>,
    model_path: PathBuf,
}

impl LocalWhisperTranscriber {
    /// Load the ggml model at `model_path`.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.is_file() {
            return Err(QuizlyError::Config(format!(
                "Whisper model not found at {}",
                model_path.display()
            )));
        }

        let path_str = model_path.to_str().ok_or_else(|| {
            QuizlyError::Config(format!("Model path is not valid UTF-8: {}", model_path.display()))
        })?;

        info!("Loading whisper model from {}", model_path.display());
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| QuizlyError::Config(format!("Failed to load whisper model: {}", e)))?;

        Ok(Self {
            ctx: Arc::new(Mutex::new(ctx)),
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    fn name(&self) -> &str {
        "local"
    }

    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let parent = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let wav_dir = tempfile::Builder::new().prefix("pcm-").tempdir_in(parent)?;
        let wav_path = wav_dir.path().join("audio.wav");
        convert_to_wav(audio_path, &wav_path).await?;

        let samples = read_samples(&wav_path)?;
        debug!(samples = samples.len(), "Decoded audio");
        drop(wav_dir);

        let ctx = Arc::clone(&self.ctx);
        tokio::task::spawn_blocking(move || run_inference(&ctx, &samples))
            .await
            .map_err(|e| QuizlyError::Transcription(format!("Inference task failed: {}", e)))?
    }
}

fn read_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)
        .map_err(|e| QuizlyError::Transcription(format!("Failed to read WAV data: {}", e)))?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.sample_rate != WHISPER_SAMPLE_RATE {
        return Err(QuizlyError::Transcription(format!(
            "expected mono {} Hz audio, got {} channel(s) at {} Hz",
            WHISPER_SAMPLE_RATE, spec.channels, spec.sample_rate
        )));
    }

    reader
        .samples::<i16>()
        .map(|s| {
            s.map(|pcm| pcm as f32 / i16::MAX as f32)
                .map_err(|e| QuizlyError::Transcription(format!("Corrupt WAV sample: {}", e)))
        })
        .collect()
}

fn run_inference(ctx: &Mutex<WhisperContext>, samples: &[f32]) -> Result<String> {
    let ctx = ctx
        .lock()
        .map_err(|_| QuizlyError::Transcription("whisper context lock poisoned".into()))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(num_cpus::get() as i32);
    params.set_no_context(true);
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let mut state = ctx
        .create_state()
        .map_err(|e| QuizlyError::Transcription(format!("failed to create whisper state: {}", e)))?;
    state
        .full(params, samples)
        .map_err(|e| QuizlyError::Transcription(format!("whisper inference failed: {}", e)))?;

    let mut texts = Vec::new();
    for segment in state.as_iter() {
        let text = segment
            .to_str()
            .map_err(|e| QuizlyError::Transcription(format!("failed to get segment text: {}", e)))?;
        texts.push(text.to_owned());
    }

    Ok(join_segments(texts))
}
