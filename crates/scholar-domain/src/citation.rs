//! Citations extracted from generated answers

use crate::{CitationId, MessageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a citation is refused by the persistence validator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CitationError {
    /// Citation text is empty or whitespace-only
    #[error("Citation text is required")]
    EmptyText,
}

/// One reference found in a model completion
///
/// Created by the extractor before the owning message exists. The extractor
/// does not validate; call [`Citation::validate`] before persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Human-readable source name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Source locator, not checked for URI syntax
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Quoted or paraphrased content
    pub text: String,
}

impl Citation {
    /// Create a citation, turning blank title and url fields into `None`
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: non_empty(title.into()),
            url: non_empty(url.into()),
            text: text.into(),
        }
    }

    /// Check the citation can be written to storage
    pub fn validate(&self) -> Result<(), CitationError> {
        if self.text.trim().is_empty() {
            return Err(CitationError::EmptyText);
        }
        Ok(())
    }

    /// Label used when the citation is bookmarked
    pub fn source_label(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown source")
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// A citation persisted against its owning message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRecord {
    /// Storage identifier
    pub id: CitationId,

    /// Assistant message the citation was extracted from
    pub message_id: MessageId,

    /// Source name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Source locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Citation content
    pub text: String,

    /// Creation time (seconds since the Unix epoch)
    pub created_at: u64,
}

impl CitationRecord {
    /// The citation fields without storage bookkeeping
    pub fn citation(&self) -> Citation {
        Citation {
            title: self.title.clone(),
            url: self.url.clone(),
            text: self.text.clone(),
        }
    }
}
