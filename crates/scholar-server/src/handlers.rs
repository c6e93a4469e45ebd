//! HTTP request handlers for the research service.
//!
//! JSON bodies use camelCase field names.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use scholar_annotator::Analyzer;
use scholar_domain::traits::{LlmProvider, ResearchStore, TextAnalyzer, VisionProvider};
use scholar_domain::{AnnotatedText, Citation, CitationId, CitationRecord, MessageId};
use scholar_extractor::{
    ExtractorError, ResearchPipeline, ResearchRequest, ResearchResponse, ScreenshotRequest,
    ScreenshotResponse,
};
use scholar_llm::{LlmError, ProviderKind};
use scholar_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Research pipeline as wired by the server
pub type Pipeline<L> = ResearchPipeline<L, SqliteStore, Analyzer>;

/// Shared application state
pub struct AppState<L> {
    /// Research pipeline (owns the LLM provider and the store handle)
    pub pipeline: Arc<Pipeline<L>>,
    /// Annotation backend for `/analyze-message`
    pub analyzer: Arc<Analyzer>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            analyzer: Arc::clone(&self.analyzer),
        }
    }
}

impl<L> AppState<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: Display,
{
    /// Wire a pipeline and the analyzer it shares with `/analyze-message`
    pub fn new(pipeline: Pipeline<L>, analyzer: Analyzer) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            analyzer: Arc::new(analyzer),
        }
    }

    fn store(&self) -> Arc<Mutex<SqliteStore>> {
        self.pipeline.store()
    }
}

/// Model selection sent with a research request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    /// Provider name (`google`)
    pub provider: String,
    /// Model override
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Output token limit
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// POST /research-ai body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchAiRequest {
    /// User prompt
    pub prompt: String,
    /// Provider and sampling settings
    pub config: ModelSettings,
    /// Conversation the answer is stored under
    pub conversation_id: String,
    /// Conversation-level instructions
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

/// POST /analyze-message body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to annotate
    pub content: String,
}

/// POST /analyze-screenshot body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeScreenshotRequest {
    /// `data:image/...;base64,` URL or bare base64 data
    pub image: String,
    /// Conversation the analysis is stored under
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// POST /chat body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User prompt
    pub prompt: String,
}

/// POST /chat response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Raw completion text
    pub generated_text: String,
}

/// POST /citations body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCitationRequest {
    /// Owning message
    pub message_id: MessageId,
    /// Source title
    #[serde(default)]
    pub title: Option<String>,
    /// Source URL
    #[serde(default)]
    pub url: Option<String>,
    /// Cited text
    pub text: String,
}

/// PUT /citations/:id body
#[derive(Debug, Deserialize)]
pub struct UpdateCitationRequest {
    /// Source title
    #[serde(default)]
    pub title: Option<String>,
    /// Source URL
    #[serde(default)]
    pub url: Option<String>,
    /// Cited text
    pub text: String,
}

/// POST /bookmarks body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRequest {
    /// Bookmarked message
    #[serde(default)]
    pub message_id: Option<MessageId>,
    /// Title of the cited source
    #[serde(default)]
    pub source_title: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Server version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request rejected as invalid
    BadRequest(String),
    /// Referenced row does not exist
    NotFound(String),
    /// Known provider without an adapter
    NotImplemented(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            AppError::InternalError(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::EmptyPrompt
            | ExtractorError::PromptTooLong(..)
            | ExtractorError::InvalidImage(_) => {
                AppError::BadRequest(e.to_string())
            }
            _ => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(_) => AppError::BadRequest(e.to_string()),
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            _ => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::UnsupportedProvider(_) => AppError::BadRequest(e.to_string()),
            LlmError::NotImplemented(_) => AppError::NotImplemented(e.to_string()),
            _ => AppError::InternalError(e.to_string()),
        }
    }
}

fn lock(store: &Mutex<SqliteStore>) -> Result<MutexGuard<'_, SqliteStore>, AppError> {
    store
        .lock()
        .map_err(|e| AppError::InternalError(format!("Store lock error: {}", e)))
}

fn parse_citation_id(id: &str) -> Result<CitationId, AppError> {
    CitationId::from_string(id).map_err(AppError::BadRequest)
}

fn fetch_citation(store: &SqliteStore, id: CitationId) -> Result<CitationRecord, AppError> {
    store
        .get_citation(id)?
        .ok_or_else(|| AppError::NotFound(format!("citation {}", id)))
}

/// POST /research-ai - Answer a prompt and store it with its citations
async fn research_ai<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ResearchAiRequest>,
) -> Result<Json<ResearchResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    ProviderKind::parse(&request.config.provider)?;

    let research = ResearchRequest {
        prompt: request.prompt,
        conversation_id: request.conversation_id,
        model: request.config.model.filter(|m| !m.is_empty()),
        temperature: request.config.temperature,
        max_tokens: request.config.max_tokens,
        custom_instructions: request.custom_instructions,
    };

    let response = state.pipeline.research(research).await?;
    Ok(Json(response))
}

/// POST /analyze-message - Heuristic scores for a message
async fn analyze_message<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnnotatedText> {
    Json(state.analyzer.analyze(&request.content).await)
}

/// POST /analyze-screenshot - Describe a screenshot with the vision model
async fn analyze_screenshot<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<AnalyzeScreenshotRequest>,
) -> Result<Json<ScreenshotResponse>, AppError>
where
    L: VisionProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let response = state
        .pipeline
        .analyze_screenshot(ScreenshotRequest {
            image: request.image,
            conversation_id: request.conversation_id,
        })
        .await?;
    Ok(Json(response))
}

/// POST /chat - Plain completion
async fn chat<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let generated_text = state.pipeline.chat(&request.prompt).await?;
    Ok(Json(ChatResponse { generated_text }))
}

/// GET /conversations/:id/citations - Newest first
async fn list_citations<L>(
    State(state): State<AppState<L>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<CitationRecord>>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let store = state.store();
    let citations = lock(&store)?.list_citations(&conversation_id)?;
    Ok(Json(citations))
}

/// POST /citations - Add a citation to an existing message
async fn create_citation<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<CreateCitationRequest>,
) -> Result<(StatusCode, Json<CitationRecord>), AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let citation = Citation::new(
        request.title.unwrap_or_default(),
        request.url.unwrap_or_default(),
        request.text,
    );

    let store = state.store();
    let mut store = lock(&store)?;
    if store.get_message(request.message_id)?.is_none() {
        return Err(AppError::NotFound(format!("message {}", request.message_id)));
    }
    let id = store.save_citation(request.message_id, &citation)?;
    let record = fetch_citation(&store, id)?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /citations/:id - Replace title, url and text
async fn update_citation<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCitationRequest>,
) -> Result<Json<CitationRecord>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let id = parse_citation_id(&id)?;
    let citation = Citation::new(
        request.title.unwrap_or_default(),
        request.url.unwrap_or_default(),
        request.text,
    );

    let store = state.store();
    let mut store = lock(&store)?;
    store.update_citation(id, &citation)?;
    Ok(Json(fetch_citation(&store, id)?))
}

/// DELETE /citations/:id
async fn delete_citation<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let id = parse_citation_id(&id)?;
    let store = state.store();
    lock(&store)?.delete_citation(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /bookmarks - Bookmark the message a citation came from
async fn create_bookmark<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<BookmarkRequest>,
) -> Result<StatusCode, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let store = state.store();
    let mut store = lock(&store)?;
    if let Some(message_id) = request.message_id {
        if store.get_message(message_id)?.is_none() {
            return Err(AppError::NotFound(format!("message {}", message_id)));
        }
    }
    store.bookmark_citation(request.message_id, request.source_title.as_deref())?;
    Ok(StatusCode::CREATED)
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: VisionProvider + Send + Sync + 'static,
    L::Error: Display,
{
    Router::new()
        .route("/research-ai", post(research_ai::<L>))
        .route("/analyze-message", post(analyze_message::<L>))
        .route("/analyze-screenshot", post(analyze_screenshot::<L>))
        .route("/chat", post(chat::<L>))
        .route("/conversations/:id/citations", get(list_citations::<L>))
        .route("/citations", post(create_citation::<L>))
        .route(
            "/citations/:id",
            put(update_citation::<L>).delete(delete_citation::<L>),
        )
        .route("/bookmarks", post(create_bookmark::<L>))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
