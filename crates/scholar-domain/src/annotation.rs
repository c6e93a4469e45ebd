//! Heuristic annotations attached to messages for display

use serde::{Deserialize, Serialize};

/// Scores computed from message text
///
/// Non-authoritative: used for badges only, never for ranking or filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedText {
    /// 0 = most negative, 1 = most positive, 0.5 = no signal
    pub sentiment: f64,

    /// Lexical and structural density in [0, 1]
    pub complexity: f64,

    /// Up to five most frequent non-stopword terms
    pub key_terms: Vec<String>,
}

impl AnnotatedText {
    /// Maximum number of key terms carried by an annotation
    pub const MAX_KEY_TERMS: usize = 5;

    /// Result for text with no signal at all (the empty string)
    pub fn empty() -> Self {
        Self {
            sentiment: 0.5,
            complexity: 0.0,
            key_terms: Vec::new(),
        }
    }

    /// Substitute used when a remote annotation call fails
    pub fn neutral() -> Self {
        Self {
            sentiment: 0.5,
            complexity: 0.5,
            key_terms: Vec::new(),
        }
    }

    /// Whether every field is inside its documented bounds
    pub fn is_within_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.sentiment)
            && (0.0..=1.0).contains(&self.complexity)
            && self.key_terms.len() <= Self::MAX_KEY_TERMS
    }
}

impl Default for AnnotatedText {
    fn default() -> Self {
        Self::neutral()
    }
}
