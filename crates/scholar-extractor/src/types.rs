//! Request and response types for the research pipeline

use scholar_domain::{Citation, MessageId};
use serde::{Deserialize, Serialize};

/// Request to answer a prompt with citations
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    /// The user's prompt
    pub prompt: String,

    /// Conversation the answer is stored under
    pub conversation_id: String,

    /// Model override; `None` uses the provider default
    pub model: Option<String>,

    /// Sampling temperature; `None` uses the configured default
    pub temperature: Option<f64>,

    /// Output token limit; `None` uses the configured default
    pub max_tokens: Option<u32>,

    /// Conversation-level instructions placed before the prompt
    pub custom_instructions: Option<String>,
}

impl ResearchRequest {
    /// Request with every optional setting left to the defaults
    pub fn new(prompt: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            conversation_id: conversation_id.into(),
            model: None,
            temperature: None,
            max_tokens: None,
            custom_instructions: None,
        }
    }
}

/// Conversation screenshot analyses are stored under when none is given
pub const SCREENSHOT_CONVERSATION: &str = "screenshots";

/// Request to describe a screenshot
#[derive(Debug, Clone)]
pub struct ScreenshotRequest {
    /// `data:image/...;base64,` URL or bare base64 data
    pub image: String,

    /// Conversation the analysis is stored under
    pub conversation_id: Option<String>,
}

/// Result of a screenshot analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotResponse {
    /// The vision model's description
    pub analysis: String,

    /// Stored assistant message; `None` when the write failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

/// A citation that was extracted but not stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationFailure {
    /// Position of the citation in the extraction output
    pub index: usize,

    /// Why it was not stored
    pub reason: String,
}

/// Result of a research request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    /// Completion with citation markers replaced
    pub generated_text: String,

    /// Every extracted citation, stored or not
    pub citations: Vec<Citation>,

    /// Identifier of the stored assistant message
    pub message_id: MessageId,

    /// Citations that were rejected or failed to write
    #[serde(default)]
    pub failures: Vec<CitationFailure>,
}

impl ResearchResponse {
    /// Number of citations written to storage
    pub fn stored_count(&self) -> usize {
        self.citations.len() - self.failures.len()
    }
}
