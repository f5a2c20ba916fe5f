//! narrate configuration management.

use crate::text::DEFAULT_MAX_CHUNK_SIZE;
use crate::tts::SpeechOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use speech_client::ProviderSettings;
use speech_client::providers::MAX_INPUT_CHARS;
use std::fs;
use std::path::PathBuf;

const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrateConfig {
    /// Speech model
    #[serde(default = "default_model")]
    pub model: String,

    /// Voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Playback speed (0.25-4.0). None leaves the API default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    /// Maximum characters per speech request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Scratch directory for chunk audio, relative to the working directory
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// FFmpeg executable. None means look it up in PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Speech API connection settings
    #[serde(default)]
    pub provider: ProviderSettings,
}

fn default_model() -> String {
    speech_client::provider::DEFAULT_MODEL.to_string()
}

fn default_voice() -> String {
    speech_client::provider::DEFAULT_VOICE.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("chunks")
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            voice: default_voice(),
            speed: None,
            chunk_size: default_chunk_size(),
            scratch_dir: default_scratch_dir(),
            ffmpeg_path: None,
            provider: ProviderSettings::default(),
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/cli-programs/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("narrate.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: NarrateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject values the speech API would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_INPUT_CHARS {
            anyhow::bail!(
                "chunk_size must be between 1 and {}, got {}",
                MAX_INPUT_CHARS,
                self.chunk_size
            );
        }

        if let Some(speed) = self.speed {
            if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
                anyhow::bail!(
                    "speed must be between {} and {}, got {}",
                    MIN_SPEED,
                    MAX_SPEED,
                    speed
                );
            }
        }

        if self.model.trim().is_empty() || self.voice.trim().is_empty() {
            anyhow::bail!("model and voice must not be empty");
        }

        Ok(())
    }

    /// Voice settings for synthesis.
    pub fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            model: self.model.clone(),
            voice: self.voice.clone(),
            speed: self.speed,
        }
    }
}

/// Clamp a speed value into the range the API accepts.
pub fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}
