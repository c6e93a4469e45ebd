//! Configuration for the research pipeline

use crate::citations::{CITATION_TAG, DEFAULT_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the research pipeline and citation extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Parenthetical used for markers whose title is empty
    pub untitled_placeholder: String,

    /// Maximum time for a single completion call (seconds)
    pub generation_timeout_secs: u64,

    /// Maximum accepted prompt length (characters)
    pub max_prompt_length: usize,

    /// Temperature used when a request does not set one
    pub default_temperature: f64,

    /// Output token limit used when a request does not set one
    pub default_max_tokens: u32,

    /// Ask the model to emit citation markers
    pub request_citations: bool,
}

impl ExtractorConfig {
    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.untitled_placeholder.trim().is_empty() {
            return Err("untitled_placeholder must not be empty".to_string());
        }
        if self.untitled_placeholder.contains(['{', '}']) {
            return Err("untitled_placeholder must not contain braces".to_string());
        }
        if self.untitled_placeholder.contains(CITATION_TAG) {
            return Err(format!("untitled_placeholder must not contain {}", CITATION_TAG));
        }
        if self.generation_timeout_secs == 0 {
            return Err("generation_timeout_secs must be greater than 0".to_string());
        }
        if self.max_prompt_length == 0 {
            return Err("max_prompt_length must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(format!(
                "default_temperature {} out of range [0.0, 2.0]",
                self.default_temperature
            ));
        }
        if self.default_max_tokens == 0 {
            return Err("default_max_tokens must be greater than 0".to_string());
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            untitled_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            generation_timeout_secs: 120,
            max_prompt_length: 50_000,
            default_temperature: 0.7,
            default_max_tokens: 2048,
            request_citations: true,
        }
    }
}
