//! Shared text-to-speech client library for the narrate workspace
//!
//! Provides a single interface over speech synthesis backends:
//! - OpenAI `audio/speech` API (and compatible servers via `base_url`)
//! - An in-process mock for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::ProviderSettings;
pub use error::{Result, SpeechError};
pub use provider::{SpeechProvider, SpeechRequest};
pub use providers::{MockProvider, OpenAiProvider, get_provider};
