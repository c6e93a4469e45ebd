//! Configuration file parsing for the server.
//!
//! Loads the bind address, database path and the nested settings of each
//! component from a TOML file. Every nested table is optional.

use scholar_annotator::{AnnotatorConfig, RemoteAnnotatorConfig};
use scholar_extractor::ExtractorConfig;
use scholar_llm::GeminiConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Research pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Local annotator settings
    #[serde(default)]
    pub annotator: AnnotatorConfig,

    /// Remote annotation delegate; local scoring when absent
    #[serde(default)]
    pub remote_annotator: Option<RemoteAnnotatorConfig>,

    /// Completion service settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: ":memory:".to_string(),
            extractor: ExtractorConfig::default(),
            annotator: AnnotatorConfig::default(),
            remote_annotator: None,
            gemini: GeminiConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".to_string()));
        }
        if self.database_path.is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".to_string()));
        }

        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("extractor: {}", e)))?;
        self.annotator
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("annotator: {}", e)))?;
        if let Some(remote) = &self.remote_annotator {
            remote
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("remote_annotator: {}", e)))?;
        }
        self.gemini
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("gemini: {}", e)))?;

        Ok(())
    }
}
