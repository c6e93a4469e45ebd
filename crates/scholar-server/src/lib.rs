//! Scholar Server
//!
//! HTTP front end for the research pipeline, the annotator and citation
//! management.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use scholar_annotator::{Analyzer, AnnotatorError};
use scholar_extractor::ResearchPipeline;
use scholar_llm::{GeminiProvider, LlmError};
use scholar_store::{SqliteStore, StoreError};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Completion provider could not be created
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Annotator could not be created
    #[error("Annotator error: {0}")]
    Annotator(#[from] AnnotatorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Open the store and wire the Gemini-backed pipeline
pub fn build_state(config: &ServerConfig) -> Result<AppState<GeminiProvider>, ServerError> {
    let store = Arc::new(Mutex::new(SqliteStore::new(&config.database_path)?));
    let provider = GeminiProvider::from_env(&config.gemini)?;
    let analyzer = Analyzer::from_config(
        config.annotator.clone(),
        config.remote_annotator.as_ref(),
    )?;

    let pipeline = ResearchPipeline::new(
        provider,
        store,
        analyzer.clone(),
        config.extractor.clone(),
    );

    Ok(AppState::new(pipeline, analyzer))
}

/// Start the HTTP server
///
/// Validates configuration, opens the store, and serves until the
/// process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Scholar server");
    info!("Database: {}", config.database_path);
    info!("Model: {}", config.gemini.model);
    match &config.remote_annotator {
        Some(remote) => info!("Annotation: remote ({})", remote.endpoint),
        None => info!("Annotation: local"),
    }

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
