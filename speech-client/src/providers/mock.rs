//! Mock speech provider for testing
//!
//! Writes canned bytes (or the request text itself) instead of calling a real
//! API, records every request, and can simulate failures.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SpeechError};
use crate::provider::{SpeechProvider, SpeechRequest};

/// What the mock writes on success
#[derive(Debug, Clone)]
enum Output {
    Fixed(Vec<u8>),
    EchoInput,
}

/// A mock provider for testing synthesis loops
pub struct MockProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Mutex<Option<SpeechError>>,
    /// Bytes written on success
    output: Output,
    /// Every request received, in order
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockProvider {
    fn build(fail_count: usize, error: Option<SpeechError>, output: Output) -> Self {
        Self {
            fail_count: AtomicUsize::new(fail_count),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(error),
            output,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always writes `audio`
    pub fn always_succeeds(audio: &[u8]) -> Self {
        Self::build(0, None, Output::Fixed(audio.to_vec()))
    }

    /// Create a provider that writes each request's input text as its "audio"
    pub fn echo() -> Self {
        Self::build(0, None, Output::EchoInput)
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: SpeechError) -> Self {
        Self::build(usize::MAX, Some(error), Output::Fixed(Vec::new()))
    }

    /// Create a provider that fails `n` times with the given error, then echoes
    pub fn fails_then_succeeds(n: usize, error: SpeechError) -> Self {
        Self::build(n, Some(error), Output::EchoInput)
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, request: &SpeechRequest, output_path: &Path) -> Result<u64> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if call_num < self.fail_count.load(Ordering::SeqCst) {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        let bytes = match &self.output {
            Output::Fixed(bytes) => bytes.clone(),
            Output::EchoInput => request.input.clone().into_bytes(),
        };
        tokio::fs::write(output_path, &bytes).await?;
        Ok(bytes.len() as u64)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Clone a SpeechError (needed because SpeechError doesn't implement Clone)
fn clone_error(err: &SpeechError) -> SpeechError {
    match err {
        SpeechError::MissingApiKey { provider, env_var } => SpeechError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        SpeechError::EmptyInput => SpeechError::EmptyInput,
        SpeechError::InputTooLong { length, limit } => SpeechError::InputTooLong {
            length: *length,
            limit: *limit,
        },
        SpeechError::RateLimited { retry_after } => SpeechError::RateLimited {
            retry_after: *retry_after,
        },
        SpeechError::ApiError {
            message,
            status_code,
        } => SpeechError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        SpeechError::Io(e) => SpeechError::Io(std::io::Error::new(e.kind(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds(b"ID3");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.mp3");

        let written = provider
            .synthesize(&SpeechRequest::new("test"), &output)
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&output).unwrap(), b"ID3");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_echo_writes_input() {
        let provider = MockProvider::echo();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.mp3");

        provider
            .synthesize(&SpeechRequest::new("Hello."), &output)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello.");
        assert_eq!(provider.requests()[0].input, "Hello.");
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(SpeechError::RateLimited { retry_after: None });
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.mp3");

        for _ in 0..3 {
            let result = provider.synthesize(&SpeechRequest::new("test"), &output).await;
            assert!(result.is_err());
        }
        assert_eq!(provider.call_count(), 3);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(
            2,
            SpeechError::ApiError {
                message: "overloaded".to_string(),
                status_code: Some(503),
            },
        );
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a.mp3");
        let request = SpeechRequest::new("third time");

        // First two calls fail
        assert!(provider.synthesize(&request, &output).await.is_err());
        assert!(provider.synthesize(&request, &output).await.is_err());

        // Third call succeeds
        assert!(provider.synthesize(&request, &output).await.is_ok());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "third time");
        assert_eq!(provider.call_count(), 3);
    }
}
