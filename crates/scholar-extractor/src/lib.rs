//! Scholar Extractor
//!
//! Turns a completion that contains inline citation markers into display text
//! plus structured citations, and runs the research flow around it.
//!
//! # Overview
//!
//! Models are asked to cite sources with markers of the form
//! `[CITATION]{title}|{url}|{text}`. Each marker is replaced in the display
//! text by `(title)` and yields one [`scholar_domain::Citation`].
//!
//! # Architecture
//!
//! ```text
//! Prompt → PromptBuilder → LLM → extract_citations → Store (message, then citations)
//!                                                  ↘ Analyzer → message metadata
//! Screenshot → InlineImage → vision model → Store (message)
//! ```
//!
//! # Example Usage
//!
//! ```
//! use scholar_extractor::extract_citations;
//!
//! let out = extract_citations("See [CITATION]{Nature}|{https://nature.com}|{Cells divide}.");
//! assert_eq!(out.clean_text, "See (Nature).");
//! assert_eq!(out.citations[0].text, "Cells divide");
//! ```
//!
//! ```no_run
//! use scholar_extractor::{ExtractorConfig, ResearchPipeline, ResearchRequest};
//! use scholar_annotator::Annotator;
//! use scholar_llm::MockProvider;
//! use scholar_store::SqliteStore;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(Mutex::new(SqliteStore::new(":memory:")?));
//! let pipeline = ResearchPipeline::new(
//!     MockProvider::new("Answer [CITATION]{Paper}|{http://x}|{quote}"),
//!     store,
//!     Annotator::default(),
//!     ExtractorConfig::default(),
//! );
//!
//! let response = pipeline
//!     .research(ResearchRequest::new("What is CRISPR?", "conv-1"))
//!     .await?;
//!
//! println!("{} ({} citations stored)", response.generated_text, response.stored_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod citations;
mod config;
mod error;
mod pipeline;
mod prompt;
mod types;


pub use citations::{
    count_markers, extract_citations, extract_citations_with, CitationExtraction, CITATION_TAG,
    DEFAULT_PLACEHOLDER,
};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use pipeline::ResearchPipeline;
pub use prompt::{PromptBuilder, SCREENSHOT_PROMPT};
pub use types::{
    CitationFailure, ResearchRequest, ResearchResponse, ScreenshotRequest, ScreenshotResponse,
    SCREENSHOT_CONVERSATION,
};
