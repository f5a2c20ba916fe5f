use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Default speech model.
pub const DEFAULT_MODEL: &str = "tts-1-hd";

/// Default voice.
pub const DEFAULT_VOICE: &str = "nova";

/// Request to synthesize one piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    pub speed: Option<f32>,
}

impl SpeechRequest {
    /// Create a request with the default model and voice
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            input: input.into(),
            speed: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_speed(mut self, speed: Option<f32>) -> Self {
        self.speed = speed;
        self
    }
}

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize the request and write the raw audio bytes to `output_path`.
    ///
    /// Returns the number of bytes written.
    async fn synthesize(&self, request: &SpeechRequest, output_path: &Path) -> Result<u64>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is usable (API key set, etc.)
    fn is_available(&self) -> Result<()>;
}
