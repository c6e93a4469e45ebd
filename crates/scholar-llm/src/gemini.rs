//! Gemini Provider Implementation
//!
//! Calls the Google generative-language `generateContent` endpoint.
//!
//! # Features
//!
//! - Async HTTP communication with a per-request timeout
//! - Configurable endpoint, model and API key variable
//! - Retry logic with exponential backoff for transport errors, 429 and 5xx
//! - Image description through a vision model
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL, so
//! transport errors cannot carry it.

use crate::LlmError;
use scholar_domain::traits::{GenerationOptions, LlmProvider, VisionProvider};
use scholar_domain::InlineImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default generative-language API base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Default model for image descriptions
pub const DEFAULT_VISION_MODEL: &str = "gemini-pro-vision";

/// Upper bound for `max_retries`
pub const MAX_RETRIES: u32 = 10;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for [`GeminiProvider`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL, without trailing slash
    pub endpoint: String,

    /// Model used when a request names none
    pub model: String,

    /// Model used for image descriptions
    pub vision_model: String,

    /// Environment variable the API key is read from
    pub api_key_env: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Attempts before giving up on transient failures
    pub max_retries: u32,

    /// First backoff delay (milliseconds); doubles on each retry
    pub retry_base_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl GeminiConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.vision_model.is_empty() {
            return Err("vision_model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 || self.max_retries > MAX_RETRIES {
            return Err(format!("max_retries must be between 1 and {}", MAX_RETRIES));
        }
        Ok(())
    }
}

/// Google Gemini completion provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    vision_model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_base_delay: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit API key
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            api_key: api_key.into(),
            client,
            max_retries: config.max_retries.clamp(1, MAX_RETRIES),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Create a provider reading the API key from `config.api_key_env`
    pub fn from_env(config: &GeminiConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    fn url_for(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    async fn generate_content(
        &self,
        model: &str,
        request_body: &GenerateContentRequest<'_>,
    ) -> Result<String, LlmError> {
        let url = self.url_for(model);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let request = self
                .client
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(request_body);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.json::<GenerateContentResponse>().await.map_err(
                            |e| {
                                LlmError::InvalidResponse(format!(
                                    "Failed to parse response: {}",
                                    e.without_url()
                                ))
                            },
                        )?;
                        return body.into_text().ok_or_else(|| {
                            LlmError::InvalidResponse("Response has no candidate text".to_string())
                        });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(model.to_string()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else if status.is_server_error() {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!(
                        "Request failed: {}",
                        e.without_url()
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = self.backoff(attempts);
                warn!(attempt = attempts, ?delay, "Gemini request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProvider for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        debug!(prompt_len = prompt.len(), "Sending Gemini generateContent request");

        let model = options.model.as_deref().unwrap_or(&self.model);
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            }),
        };
        self.generate_content(model, &request_body).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl VisionProvider for GeminiProvider {
    async fn describe_image(&self, prompt: &str, image: &InlineImage) -> Result<String, LlmError> {
        debug!(
            mime_type = %image.mime_type,
            image_len = image.data.len(),
            "Sending Gemini image request"
        );

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
            generation_config: None,
        };
        self.generate_content(&self.vision_model, &request_body).await
    }

    fn vision_model_name(&self) -> &str {
        &self.vision_model
    }
}
