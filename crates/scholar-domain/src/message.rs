//! Chat messages and their metadata

use crate::{AnnotatedText, MessageId};
use serde::{Deserialize, Serialize};

/// Current layout of [`MessageMetadata`]
pub const METADATA_VERSION: u32 = 1;

/// Cost per thousand estimated tokens used for [`TokenMetrics::estimate`]
pub const DEFAULT_COST_PER_1K_TOKENS: f64 = 0.03;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the assistant
    User,
    /// Produced by the completion service
    Assistant,
}

impl Role {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// Token usage estimate for a message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    /// Tokens sent to the model
    pub input_tokens: u64,
    /// Tokens produced by the model
    pub output_tokens: u64,
    /// Estimated cost in dollars
    pub total_cost: f64,
}

impl TokenMetrics {
    /// Rough estimate at four characters per token
    pub fn estimate(text: &str) -> Self {
        let input_tokens = (text.chars().count() as u64).div_ceil(4);
        Self {
            input_tokens,
            output_tokens: 0,
            total_cost: input_tokens as f64 / 1000.0 * DEFAULT_COST_PER_1K_TOKENS,
        }
    }

    /// Estimate for a prompt and the completion it produced
    pub fn for_exchange(prompt: &str, completion: &str) -> Self {
        let input_tokens = Self::estimate(prompt).input_tokens;
        let output_tokens = Self::estimate(completion).input_tokens;
        Self {
            input_tokens,
            output_tokens,
            total_cost: (input_tokens + output_tokens) as f64 / 1000.0 * DEFAULT_COST_PER_1K_TOKENS,
        }
    }
}

/// Per-kind message details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageDetails {
    /// A prompt written by the user
    UserPrompt,

    /// An answer produced by the research pipeline
    Research {
        /// Model that produced the answer
        model: String,
        /// Sampling temperature used
        temperature: f64,
        /// Output token limit used
        max_tokens: u32,
        /// Number of citation markers found in the completion
        citation_count: usize,
    },

    /// A plain chat completion without citation handling
    Chat {
        /// Model that produced the answer
        model: String,
    },

    /// A vision model's description of a screenshot
    ScreenshotAnalysis {
        /// Vision model that produced the description
        model: String,
    },
}

/// Closed, versioned metadata stored with every message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Layout version, see [`METADATA_VERSION`]
    pub version: u32,

    /// Kind-specific fields
    pub details: MessageDetails,

    /// Display-only heuristic scores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotatedText>,

    /// Token usage estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_metrics: Option<TokenMetrics>,

    /// Pinned by the user
    #[serde(default)]
    pub pinned: bool,

    /// Last edit time (seconds since the Unix epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<u64>,
}

impl MessageMetadata {
    /// Metadata for the given kind with every optional field unset
    pub fn new(details: MessageDetails) -> Self {
        Self {
            version: METADATA_VERSION,
            details,
            annotation: None,
            token_metrics: None,
            pinned: false,
            edited_at: None,
        }
    }

    /// Attach token metrics
    pub fn with_token_metrics(mut self, metrics: TokenMetrics) -> Self {
        self.token_metrics = Some(metrics);
        self
    }

    /// Attach an annotation
    pub fn with_annotation(mut self, annotation: AnnotatedText) -> Self {
        self.annotation = Some(annotation);
        self
    }
}

/// A message about to be written to storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    /// Conversation the message belongs to
    pub conversation_id: String,
    /// Author
    pub role: Role,
    /// Display text (citation markers already replaced)
    pub content: String,
    /// Model name, empty for user messages
    pub model_name: String,
    /// Structured metadata
    pub metadata: MessageMetadata,
}

/// A persisted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Storage identifier
    pub id: MessageId,
    /// Conversation the message belongs to
    pub conversation_id: String,
    /// Author
    pub role: Role,
    /// Display text
    pub content: String,
    /// Model name, empty for user messages
    pub model_name: String,
    /// Structured metadata
    pub metadata: MessageMetadata,
    /// Creation time (seconds since the Unix epoch)
    pub created_at: u64,
}
