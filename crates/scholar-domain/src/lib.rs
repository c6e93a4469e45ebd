//! Scholar Domain Layer
//!
//! Core types and trait interfaces for the research assistant backend. Other
//! crates depend on this one; it depends on nothing but identifiers and serde.
//!
//! ## Key Concepts
//!
//! - **Citation**: a reference extracted from a generated answer
//! - **Message**: a stored chat turn with closed, versioned metadata
//! - **AnnotatedText**: heuristic sentiment/complexity/key-term scores
//! - **TokenMetrics**: rough token usage estimate
//! - **InlineImage**: a screenshot sent to a vision model
//!
//! ## Architecture
//!
//! - Pure data and business rules only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotation;
pub mod citation;
pub mod ids;
pub mod image;
pub mod message;
pub mod traits;

// Re-exports for convenience
pub use annotation::AnnotatedText;
pub use citation::{Citation, CitationError, CitationRecord};
pub use ids::{CitationId, MessageId};
pub use image::{ImageError, InlineImage, DEFAULT_IMAGE_MIME};
pub use message::{
    Message, MessageDetails, MessageMetadata, NewMessage, Role, TokenMetrics, METADATA_VERSION,
};

/// Current time in seconds since the Unix epoch
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
