//! Research pipeline: completion, citation extraction, persistence, annotation

use crate::citations::extract_citations_with;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::{PromptBuilder, SCREENSHOT_PROMPT};
use crate::types::{
    CitationFailure, ResearchRequest, ResearchResponse, ScreenshotRequest, ScreenshotResponse,
    SCREENSHOT_CONVERSATION,
};
use scholar_domain::traits::{
    GenerationOptions, LlmProvider, ResearchStore, TextAnalyzer, VisionProvider,
};
use scholar_domain::{
    Citation, InlineImage, MessageDetails, MessageId, MessageMetadata, NewMessage, Role,
    TokenMetrics,
};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a prompt into a stored, cited, annotated assistant message
///
/// Steps, in order:
/// 1. generate the completion
/// 2. split citation markers from the display text
/// 3. store the message, then each citation against the new message id
/// 4. annotate the display text and attach it to the stored message
///
/// Step 4 is best effort and never fails the request. In step 3 every
/// citation is an independent write.
pub struct ResearchPipeline<L, S, A> {
    llm_provider: Arc<L>,
    store: Arc<Mutex<S>>,
    analyzer: Arc<A>,
    config: ExtractorConfig,
}

impl<L, S, A> ResearchPipeline<L, S, A>
where
    L: LlmProvider + Send + Sync,
    L::Error: Display,
    S: ResearchStore + Send,
    S::Error: Display,
    A: TextAnalyzer + Send + Sync,
{
    /// Create a new pipeline over a shared store
    pub fn new(llm_provider: L, store: Arc<Mutex<S>>, analyzer: A, config: ExtractorConfig) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            store,
            analyzer: Arc::new(analyzer),
            config,
        }
    }

    /// The store messages and citations are written to
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Answer a prompt, storing the answer and its citations
    pub async fn research(
        &self,
        request: ResearchRequest,
    ) -> Result<ResearchResponse, ExtractorError> {
        self.check_prompt(&request.prompt)?;

        info!(
            conversation = %request.conversation_id,
            prompt_len = request.prompt.len(),
            "Starting research request"
        );

        let mut builder = PromptBuilder::new(request.prompt.as_str())
            .with_citations(self.config.request_citations);
        if let Some(instructions) = &request.custom_instructions {
            builder = builder.with_custom_instructions(instructions.as_str());
        }
        let prompt = builder.build();

        let options = GenerationOptions {
            model: request.model.clone(),
            temperature: request.temperature.unwrap_or(self.config.default_temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
        };

        let raw = self.call_llm(&prompt, &options).await?;
        debug!("LLM response length: {} chars", raw.len());

        let extraction = extract_citations_with(&raw, &self.config.untitled_placeholder);
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.llm_provider.model_name().to_string());

        let metadata = MessageMetadata::new(MessageDetails::Research {
            model: model.clone(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            citation_count: extraction.marker_count(),
        })
        .with_token_metrics(TokenMetrics::for_exchange(&prompt, &raw));

        let message_id = {
            let mut store = self.lock_store()?;
            store
                .save_message(NewMessage {
                    conversation_id: request.conversation_id.clone(),
                    role: Role::Assistant,
                    content: extraction.clean_text.clone(),
                    model_name: model,
                    metadata: metadata.clone(),
                })
                .map_err(|e| ExtractorError::Store(e.to_string()))?
        };

        let failures = self.save_citations(message_id, &extraction.citations);
        self.annotate_message(message_id, &extraction.clean_text, metadata)
            .await;

        info!(
            message = %message_id,
            citations = extraction.citations.len(),
            failed = failures.len(),
            "Research request complete"
        );

        Ok(ResearchResponse {
            generated_text: extraction.clean_text,
            citations: extraction.citations,
            message_id,
            failures,
        })
    }

    /// Plain completion without citation handling or persistence
    pub async fn chat(&self, prompt: &str) -> Result<String, ExtractorError> {
        self.check_prompt(prompt)?;

        let options = GenerationOptions {
            model: None,
            temperature: self.config.default_temperature,
            max_tokens: self.config.default_max_tokens,
        };
        self.call_llm(prompt, &options).await
    }

    fn check_prompt(&self, prompt: &str) -> Result<(), ExtractorError> {
        if prompt.trim().is_empty() {
            return Err(ExtractorError::EmptyPrompt);
        }
        let len = prompt.chars().count();
        if len > self.config.max_prompt_length {
            return Err(ExtractorError::PromptTooLong(len, self.config.max_prompt_length));
        }
        Ok(())
    }

    async fn call_llm(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ExtractorError> {
        timeout(
            self.config.generation_timeout(),
            self.llm_provider.generate(prompt, options),
        )
        .await
        .map_err(|_| ExtractorError::Timeout)?
        .map_err(|e| ExtractorError::Llm(e.to_string()))
    }

    /// Validate and write each citation on its own
    fn save_citations(&self, message_id: MessageId, citations: &[Citation]) -> Vec<CitationFailure> {
        let mut failures = Vec::new();

        for (index, citation) in citations.iter().enumerate() {
            if let Err(e) = citation.validate() {
                warn!(index, "Citation rejected: {}", e);
                failures.push(CitationFailure {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }

            let result = self
                .lock_store()
                .and_then(|mut store| {
                    store
                        .save_citation(message_id, citation)
                        .map_err(|e| ExtractorError::Store(e.to_string()))
                });

            if let Err(e) = result {
                warn!(index, "Failed to store citation: {}", e);
                failures.push(CitationFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }

        failures
    }

    async fn annotate_message(&self, message_id: MessageId, text: &str, metadata: MessageMetadata) {
        let annotation = self.analyzer.analyze(text).await;
        let metadata = metadata.with_annotation(annotation);

        let result = self.lock_store().and_then(|mut store| {
            store
                .update_message_metadata(message_id, &metadata)
                .map_err(|e| ExtractorError::Store(e.to_string()))
        });

        if let Err(e) = result {
            warn!(message = %message_id, "Failed to attach annotation: {}", e);
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, ExtractorError> {
        self.store
            .lock()
            .map_err(|e| ExtractorError::Store(format!("Store lock error: {}", e)))
    }
}

impl<L, S, A> ResearchPipeline<L, S, A>
where
    L: VisionProvider + Send + Sync,
    L::Error: Display,
    S: ResearchStore + Send,
    S::Error: Display,
    A: TextAnalyzer + Send + Sync,
{
    /// Describe a screenshot and store the description as an assistant message
    ///
    /// A failed write is logged and the description is still returned.
    pub async fn analyze_screenshot(
        &self,
        request: ScreenshotRequest,
    ) -> Result<ScreenshotResponse, ExtractorError> {
        let image = InlineImage::from_data_url(&request.image)?;
        let conversation_id = request
            .conversation_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| SCREENSHOT_CONVERSATION.to_string());

        info!(
            conversation = %conversation_id,
            mime_type = %image.mime_type,
            "Starting screenshot analysis"
        );

        let analysis = timeout(
            self.config.generation_timeout(),
            self.llm_provider.describe_image(SCREENSHOT_PROMPT, &image),
        )
        .await
        .map_err(|_| ExtractorError::Timeout)?
        .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        let model = self.llm_provider.vision_model_name().to_string();
        let metadata = MessageMetadata::new(MessageDetails::ScreenshotAnalysis {
            model: model.clone(),
        })
        .with_token_metrics(TokenMetrics::for_exchange(SCREENSHOT_PROMPT, &analysis));

        let saved = self.lock_store().and_then(|mut store| {
            store
                .save_message(NewMessage {
                    conversation_id,
                    role: Role::Assistant,
                    content: analysis.clone(),
                    model_name: model,
                    metadata,
                })
                .map_err(|e| ExtractorError::Store(e.to_string()))
        });

        let message_id = match saved {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to store screenshot analysis: {}", e);
                None
            }
        };

        Ok(ScreenshotResponse {
            analysis,
            message_id,
        })
    }
}
