//! Chunk-by-chunk speech synthesis.

use crate::text::TextChunk;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use speech_client::{SpeechProvider, SpeechRequest};
use std::path::{Path, PathBuf};

/// Extension of every audio file this tool reads or writes.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Voice settings applied to every chunk of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    /// Speech model, e.g. `tts-1-hd`
    pub model: String,
    /// Voice name, e.g. `nova`
    pub voice: String,
    /// Playback speed (0.25-4.0); `None` leaves the API default
    pub speed: Option<f32>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            model: speech_client::provider::DEFAULT_MODEL.to_string(),
            voice: speech_client::provider::DEFAULT_VOICE.to_string(),
            speed: None,
        }
    }
}

impl SpeechOptions {
    /// Build the request for one chunk.
    pub fn request(&self, text: &str) -> SpeechRequest {
        SpeechRequest::new(text)
            .with_model(&self.model)
            .with_voice(&self.voice)
            .with_speed(self.speed)
    }
}

/// File name for a chunk's audio.
///
/// Ordinals are zero-padded so that name order matches chunk order.
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{:04}.{}", index, AUDIO_EXTENSION)
}

/// Synthesize every chunk, in order, into `output_dir`.
///
/// Returns the written files in chunk order. Stops at the first failed request.
pub async fn synthesize_chunks(
    provider: &dyn SpeechProvider,
    chunks: &[TextChunk],
    options: &SpeechOptions,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    info!(
        "Converting {} chunks to audio in {} with {}",
        chunks.len(),
        output_dir.display(),
        provider.name()
    );

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut audio_files = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let output_file = output_dir.join(chunk_file_name(chunk.index));
        pb.set_message(format!("chunk {}", chunk.index));

        let bytes = provider
            .synthesize(&options.request(&chunk.text), &output_file)
            .await
            .with_context(|| format!("Speech synthesis failed for chunk {}", chunk.index))?;

        debug!("Audio saved to {} ({} bytes)", output_file.display(), bytes);
        audio_files.push(output_file);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Converted {} chunks to audio files", audio_files.len());

    Ok(audio_files)
}
