//! Speech provider implementations

pub mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::{MAX_INPUT_CHARS, OpenAiProvider};

use crate::config::{OPENAI_API_KEY_ENV, ProviderSettings};
use crate::error::{Result, SpeechError};
use crate::provider::SpeechProvider;

/// Create the speech provider described by `settings`
pub fn get_provider(settings: &ProviderSettings) -> Result<Box<dyn SpeechProvider>> {
    let api_key = get_api_key(settings, OPENAI_API_KEY_ENV, "OpenAI")?;
    Ok(Box::new(OpenAiProvider::new(settings.base_url(), api_key)))
}

/// Get API key from config or environment variable
fn get_api_key(settings: &ProviderSettings, env_var: &str, provider_name: &str) -> Result<String> {
    // Check config first
    if let Some(key) = settings.api_key.clone().filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }

    // Fall back to environment variable
    std::env::var(env_var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| SpeechError::MissingApiKey {
            provider: provider_name.to_string(),
            env_var: env_var.to_string(),
        })
}
