//! Configuration for local and remote annotation

use scholar_domain::AnnotatedText;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relative weight of each complexity factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    /// Mean word length
    pub word_length: f64,
    /// Mean words per sentence
    pub sentence_length: f64,
    /// Fraction of technical tokens
    pub technical: f64,
    /// Fenced code block present
    pub code_block: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            word_length: 0.3,
            sentence_length: 0.3,
            technical: 0.25,
            code_block: 0.15,
        }
    }
}

/// Replacement word lists; `None` keeps the built-in list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconOverrides {
    /// Positive affect terms
    pub positive: Option<Vec<String>>,
    /// Negative affect terms
    pub negative: Option<Vec<String>>,
    /// Technical terms
    pub technical: Option<Vec<String>>,
    /// Stopwords excluded from key terms
    pub stopwords: Option<Vec<String>>,
}

/// Configuration for the local [`crate::Annotator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Sentiment change per affect term
    pub sentiment_step: f64,

    /// Mean word length that scores 1.0
    pub word_length_scale: f64,

    /// Mean words per sentence that scores 1.0
    pub sentence_length_scale: f64,

    /// Technical token fraction that scores 1.0
    pub technical_fraction_scale: f64,

    /// Complexity factor weights
    pub weights: ComplexityWeights,

    /// Number of key terms returned (at most 5)
    pub max_key_terms: usize,

    /// Shortest token considered a key term
    pub min_term_length: usize,

    /// Word list replacements
    pub lexicon: LexiconOverrides,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            sentiment_step: 0.1,
            word_length_scale: 10.0,
            sentence_length_scale: 25.0,
            technical_fraction_scale: 0.2,
            weights: ComplexityWeights::default(),
            max_key_terms: AnnotatedText::MAX_KEY_TERMS,
            min_term_length: 3,
            lexicon: LexiconOverrides::default(),
        }
    }
}

impl AnnotatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.sentiment_step > 0.0 && self.sentiment_step <= 0.5) {
            return Err(format!(
                "sentiment_step {} out of range (0.0, 0.5]",
                self.sentiment_step
            ));
        }
        for (name, scale) in [
            ("word_length_scale", self.word_length_scale),
            ("sentence_length_scale", self.sentence_length_scale),
            ("technical_fraction_scale", self.technical_fraction_scale),
        ] {
            if scale <= 0.0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }

        let w = &self.weights;
        if [w.word_length, w.sentence_length, w.technical, w.code_block]
            .iter()
            .any(|weight| *weight < 0.0)
        {
            return Err("complexity weights must not be negative".to_string());
        }

        if self.max_key_terms > AnnotatedText::MAX_KEY_TERMS {
            return Err(format!(
                "max_key_terms {} exceeds {}",
                self.max_key_terms,
                AnnotatedText::MAX_KEY_TERMS
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Configuration for [`crate::RemoteAnnotator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteAnnotatorConfig {
    /// URL the `{ content }` request is POSTed to
    pub endpoint: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for RemoteAnnotatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:54321/functions/v1/analyze-message".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RemoteAnnotatorConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!("endpoint must be an http(s) URL: {}", self.endpoint));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
