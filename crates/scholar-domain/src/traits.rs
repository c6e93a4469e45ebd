//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    AnnotatedText, Citation, CitationId, CitationRecord, InlineImage, Message, MessageId,
    MessageMetadata, NewMessage,
};
use std::future::Future;

/// Sampling parameters passed to a completion service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Model override; `None` uses the provider's configured model
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum number of output tokens
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (scholar-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a text completion
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Name of the model used when the options carry no override
    fn model_name(&self) -> &str;
}

/// Completion providers that also accept an image
///
/// Shares the provider's error type so callers handle one failure path.
pub trait VisionProvider: LlmProvider {
    /// Describe an image, following the instructions in `prompt`
    fn describe_image(
        &self,
        prompt: &str,
        image: &InlineImage,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Name of the model used for images
    fn vision_model_name(&self) -> &str;
}

/// Trait for storing messages and their citations
///
/// Implemented by the infrastructure layer (scholar-store)
pub trait ResearchStore {
    /// Error type for store operations
    type Error;

    /// Persist a message and return its identifier
    fn save_message(&mut self, message: NewMessage) -> Result<MessageId, Self::Error>;

    /// Get a message by ID
    fn get_message(&self, id: MessageId) -> Result<Option<Message>, Self::Error>;

    /// Replace a message's content and metadata
    fn update_message(
        &mut self,
        id: MessageId,
        content: &str,
        metadata: &MessageMetadata,
    ) -> Result<(), Self::Error>;

    /// Replace only a message's metadata
    fn update_message_metadata(
        &mut self,
        id: MessageId,
        metadata: &MessageMetadata,
    ) -> Result<(), Self::Error>;

    /// Messages of a conversation, oldest first
    fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, Self::Error>;

    /// Persist one citation against an existing message
    ///
    /// Requiring a `MessageId` means the owning message must already be stored.
    fn save_citation(
        &mut self,
        message_id: MessageId,
        citation: &Citation,
    ) -> Result<CitationId, Self::Error>;

    /// Get a citation by ID
    fn get_citation(&self, id: CitationId) -> Result<Option<CitationRecord>, Self::Error>;

    /// Citations of a conversation, newest first
    fn list_citations(&self, conversation_id: &str) -> Result<Vec<CitationRecord>, Self::Error>;

    /// Replace a citation's title, url and text
    fn update_citation(&mut self, id: CitationId, citation: &Citation) -> Result<(), Self::Error>;

    /// Remove a citation
    fn delete_citation(&mut self, id: CitationId) -> Result<(), Self::Error>;

    /// Bookmark the message a citation came from
    fn bookmark_citation(
        &mut self,
        message_id: Option<MessageId>,
        source_title: Option<&str>,
    ) -> Result<(), Self::Error>;
}

/// Trait for producing display annotations from text
///
/// Implementations never fail: a degraded result is returned instead.
pub trait TextAnalyzer {
    /// Annotate the given text
    fn analyze(&self, text: &str) -> impl Future<Output = AnnotatedText> + Send;
}
