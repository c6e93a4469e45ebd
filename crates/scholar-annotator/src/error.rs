//! Error types for remote annotation

use thiserror::Error;

/// Errors from the remote annotation delegate
///
/// Only [`crate::RemoteAnnotator::try_annotate`] returns these. Local
/// annotation cannot fail.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// Request could not be sent or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote answered with a non-success status
    #[error("Remote returned HTTP {0}")]
    Status(u16),

    /// Response body is not an annotation
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Response parsed but a score is outside [0, 1] or too many key terms
    #[error("Annotation out of range: {0}")]
    OutOfRange(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
