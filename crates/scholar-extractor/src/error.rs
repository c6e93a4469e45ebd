//! Error types for the research pipeline

use scholar_domain::ImageError;
use thiserror::Error;

/// Errors that can occur while producing a research answer
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Message store error
    #[error("Store error: {0}")]
    Store(String),

    /// Prompt is empty
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// Screenshot payload rejected
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    /// Prompt exceeds maximum length
    #[error("Prompt too long: {0} chars (max: {1})")]
    PromptTooLong(usize, usize),

    /// Completion timeout
    #[error("Completion timeout")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
