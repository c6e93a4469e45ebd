//! Scholar LLM Provider Layer
//!
//! Completion service adapters behind the `LlmProvider` trait from
//! `scholar-domain`. The completion service is opaque to the rest of the
//! workspace: text in, text out.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google generative-language REST API
//!
//! # Examples
//!
//! ```
//! use scholar_llm::MockProvider;
//! use scholar_domain::traits::{GenerationOptions, LlmProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", &GenerationOptions::default()).await;
//! assert_eq!(result.unwrap(), "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;

use scholar_domain::traits::{GenerationOptions, LlmProvider, VisionProvider};
use scholar_domain::InlineImage;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// API key environment variable is unset
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    /// Provider name is not known at all
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Provider is known but has no adapter yet
    #[error("Provider not implemented yet: {0}")]
    NotImplemented(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Completion backends a request may name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google generative-language models
    Google,
}

impl ProviderKind {
    /// Resolve a provider name from a request (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use scholar_llm::{LlmError, ProviderKind};
    ///
    /// assert_eq!(ProviderKind::parse("Google").unwrap(), ProviderKind::Google);
    /// assert!(matches!(ProviderKind::parse("openai"), Err(LlmError::NotImplemented(_))));
    /// assert!(matches!(ProviderKind::parse("acme"), Err(LlmError::UnsupportedProvider(_))));
    /// ```
    pub fn parse(name: &str) -> Result<Self, LlmError> {
        match name.to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "anthropic" | "openai" => Err(LlmError::NotImplemented(name.to_string())),
            _ => Err(LlmError::UnsupportedProvider(name.to_string())),
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Clones share responses, call count and recorded options.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model: String,
    responses: Arc<Mutex<HashMap<String, Option<String>>>>,
    call_count: Arc<Mutex<usize>>,
    last_options: Arc<Mutex<Option<GenerationOptions>>>,
    last_image: Arc<Mutex<Option<InlineImage>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model: "mock-model".to_string(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_options: Arc::new(Mutex::new(None)),
            last_image: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), Some(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), None);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Options passed to the most recent call
    pub fn last_options(&self) -> Option<GenerationOptions> {
        lock(&self.last_options).clone()
    }

    /// Image passed to the most recent `describe_image` call
    pub fn last_image(&self) -> Option<InlineImage> {
        lock(&self.last_image).clone()
    }

    fn respond(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_options) = Some(options.clone());

        match lock(&self.responses).get(prompt) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        std::future::ready(self.respond(prompt, options))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl VisionProvider for MockProvider {
    fn describe_image(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        *lock(&self.last_image) = Some(image.clone());
        std::future::ready(self.respond(prompt, &GenerationOptions::default()))
    }

    fn vision_model_name(&self) -> &str {
        "mock-vision-model"
    }
}
