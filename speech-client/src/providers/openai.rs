//! OpenAI speech provider
//!
//! Posts to the `audio/speech` endpoint of the OpenAI API, or of any server that
//! implements the same contract when a custom base URL is configured.

use async_trait::async_trait;
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, SpeechRequest};

/// Maximum input length accepted by the speech endpoint, in characters.
pub const MAX_INPUT_CHARS: usize = 4096;

/// Provider for the OpenAI speech API
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiProvider {
    /// Create a provider for the given base URL
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS roots)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

impl<'a> From<&'a SpeechRequest> for SpeechBody<'a> {
    fn from(request: &'a SpeechRequest) -> Self {
        Self {
            model: &request.model,
            input: &request.input,
            voice: &request.voice,
            response_format: "mp3",
            speed: request.speed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Check input length before spending a request on it.
fn validate_input(input: &str) -> Result<()> {
    if input.trim().is_empty() {
        return Err(SpeechError::EmptyInput);
    }

    let length = input.chars().count();
    if length > MAX_INPUT_CHARS {
        return Err(SpeechError::InputTooLong {
            length,
            limit: MAX_INPUT_CHARS,
        });
    }

    Ok(())
}

/// Pull the human-readable message out of an error body, if it is JSON.
fn error_message(body: String) -> String {
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error_response) => error_response.error.message,
        Err(_) => body,
    }
}

#[async_trait]
impl SpeechProvider for OpenAiProvider {
    async fn synthesize(&self, request: &SpeechRequest, output_path: &Path) -> Result<u64> {
        validate_input(&request.input)?;

        let url = self.endpoint();
        debug!(
            "POST {} ({} chars, model {}, voice {})",
            url,
            request.input.chars().count(),
            request.model,
            request.voice
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&SpeechBody::from(request))
            .send()
            .await
            .map_err(|e| SpeechError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse().ok());
                return Err(SpeechError::RateLimited { retry_after });
            }

            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::ApiError {
                message: error_message(error_text),
                status_code: Some(status.as_u16()),
            });
        }

        let mut file = tokio::fs::File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| SpeechError::ApiError {
                message: format!("Error reading response: {}", e),
                status_code: None,
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn is_available(&self) -> Result<()> {
        // API key was provided in constructor
        Ok(())
    }
}
