//! Integration tests for the HTTP service

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use scholar_annotator::{Analyzer, RemoteAnnotator, RemoteAnnotatorConfig};
use scholar_domain::traits::ResearchStore;
use scholar_domain::{AnnotatedText, CitationRecord, MessageDetails};
use scholar_extractor::{ExtractorConfig, ResearchPipeline, SCREENSHOT_PROMPT};
use scholar_llm::MockProvider;
use scholar_server::handlers::{
    create_router, AppState, ChatResponse, ErrorResponse, HealthCheckResponse,
};
use scholar_store::SqliteStore;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for oneshot

const ANSWER: &str = "Gene drives spread fast [CITATION]{Esvelt 2014}|{https://doi.org/e}|{Concerning RNA-guided gene drives}. \
Caution is advised [CITATION]{}|{}|{Field notes}.";

/// Helper to create a router over an in-memory store
fn create_test_app(llm: MockProvider) -> (Router, Arc<Mutex<SqliteStore>>) {
    create_test_app_with(llm, Analyzer::default())
}

fn create_test_app_with(
    llm: MockProvider,
    analyzer: Analyzer,
) -> (Router, Arc<Mutex<SqliteStore>>) {
    let store = Arc::new(Mutex::new(SqliteStore::new(":memory:").unwrap()));
    let pipeline = ResearchPipeline::new(
        llm,
        Arc::clone(&store),
        analyzer.clone(),
        ExtractorConfig::default(),
    );
    (create_router(AppState::new(pipeline, analyzer)), store)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn research_body(provider: &str) -> Value {
    json!({
        "prompt": "Are gene drives safe?",
        "config": { "provider": provider, "model": "gemini-pro", "temperature": 0.3, "maxTokens": 512 },
        "conversationId": "conv-1"
    })
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_app(MockProvider::default());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthCheckResponse = body_json(response).await;
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_research_ai_stores_message_and_citations() {
    let llm = MockProvider::new(ANSWER);
    let (app, store) = create_test_app(llm.clone());

    let response = app
        .oneshot(json_request("POST", "/research-ai", research_body("google")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert_eq!(
        body["generatedText"],
        "Gene drives spread fast (Esvelt 2014). Caution is advised (Source)."
    );
    assert_eq!(body["citations"].as_array().unwrap().len(), 2);
    assert_eq!(body["citations"][0]["title"], "Esvelt 2014");
    assert!(body["citations"][1].get("title").is_none());
    assert_eq!(body["failures"].as_array().unwrap().len(), 0);

    let options = llm.last_options().unwrap();
    assert_eq!(options.model.as_deref(), Some("gemini-pro"));
    assert_eq!(options.max_tokens, 512);

    let store = store.lock().unwrap();
    let citations = store.list_citations("conv-1").unwrap();
    assert_eq!(citations.len(), 2);
    let message_id = body["messageId"].as_str().unwrap();
    assert!(citations.iter().all(|c| c.message_id.to_string() == message_id));
}

#[tokio::test]
async fn test_research_ai_provider_routing() {
    let (app, _) = create_test_app(MockProvider::new(ANSWER));
    let response = app
        .oneshot(json_request("POST", "/research-ai", research_body("OpenAI")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let (app, store) = create_test_app(MockProvider::new(ANSWER));
    let response = app
        .oneshot(json_request("POST", "/research-ai", research_body("acme")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = body_json(response).await;
    assert!(error.error.contains("acme"));
    assert!(store.lock().unwrap().list_messages("conv-1").unwrap().is_empty());
}

#[tokio::test]
async fn test_research_ai_rejects_empty_prompt() {
    let (app, _) = create_test_app(MockProvider::new(ANSWER));
    let body = json!({
        "prompt": "   ",
        "config": { "provider": "google" },
        "conversationId": "conv-1"
    });

    let response = app
        .oneshot(json_request("POST", "/research-ai", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_message_local() {
    let (app, _) = create_test_app(MockProvider::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/analyze-message",
            json!({ "content": "This is good and great" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert!(body["sentiment"].as_f64().unwrap() > 0.5);
    assert!(body["keyTerms"].is_array());
}

#[tokio::test]
async fn test_analyze_message_remote_failure_is_neutral() {
    let upstream = Router::new().route(
        "/analyze",
        axum::routing::post(|| async { (StatusCode::BAD_GATEWAY, "down") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let remote = RemoteAnnotator::new(&RemoteAnnotatorConfig {
        endpoint: format!("http://{}/analyze", addr),
        timeout_secs: 2,
    })
    .unwrap();
    let (app, _) = create_test_app_with(MockProvider::default(), Analyzer::Remote(remote));

    let response = app
        .oneshot(json_request(
            "POST",
            "/analyze-message",
            json!({ "content": "anything at all" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let annotation: AnnotatedText = body_json(response).await;
    assert_eq!(annotation, AnnotatedText::neutral());
}

#[tokio::test]
async fn test_analyze_screenshot_stores_analysis() {
    let mut llm = MockProvider::default();
    llm.add_response(SCREENSHOT_PROMPT, "A dashboard with a revenue chart");
    let (app, store) = create_test_app(llm.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/analyze-screenshot",
            json!({ "image": "data:image/jpeg;base64,/9j/4AAQ", "conversationId": "conv-2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = body_json(response).await;
    assert_eq!(body["analysis"], "A dashboard with a revenue chart");
    assert_eq!(llm.last_image().unwrap().data, "/9j/4AAQ");

    let messages = store.lock().unwrap().list_messages("conv-2").unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(body["messageId"], messages[0].id.to_string());
    assert!(matches!(
        messages[0].metadata.details,
        MessageDetails::ScreenshotAnalysis { .. }
    ));
}

#[tokio::test]
async fn test_analyze_screenshot_rejects_non_image() {
    let (app, store) = create_test_app(MockProvider::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/analyze-screenshot",
            json!({ "image": "data:text/html;base64,PGgxPg==" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.lock().unwrap().list_messages("screenshots").unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_returns_raw_completion() {
    let mut llm = MockProvider::default();
    llm.add_response("hello", "hi [CITATION]{a}|{b}|{c}");
    let (app, store) = create_test_app(llm);

    let response = app
        .oneshot(json_request("POST", "/chat", json!({ "prompt": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let chat: ChatResponse = body_json(response).await;
    assert_eq!(chat.generated_text, "hi [CITATION]{a}|{b}|{c}");
    assert!(store.lock().unwrap().list_citations("conv-1").unwrap().is_empty());
}

#[tokio::test]
async fn test_citation_management_lifecycle() {
    let (app, _) = create_test_app(MockProvider::new(ANSWER));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/research-ai", research_body("google")))
        .await
        .unwrap();
    let body: Value = body_json(response).await;
    let message_id = body["messageId"].as_str().unwrap().to_string();

    // Add a citation by hand
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/citations",
            json!({ "messageId": message_id, "title": "Manual", "text": "added later" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CitationRecord = body_json(response).await;
    assert_eq!(created.title.as_deref(), Some("Manual"));
    assert_eq!(created.url, None);

    // Blank text is a validation error
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/citations",
            json!({ "messageId": message_id, "text": "  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Edit
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/citations/{}", created.id),
            json!({ "title": "Manual (rev)", "url": "http://m", "text": "edited" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: CitationRecord = body_json(response).await;
    assert_eq!(updated.text, "edited");
    assert_eq!(updated.url.as_deref(), Some("http://m"));

    // List shows all three
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/conversations/conv-1/citations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed: Vec<CitationRecord> = body_json(response).await;
    assert_eq!(listed.len(), 3);

    // Delete, then delete again
    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/citations/{}", created.id))
            .body(Body::empty())
            .unwrap()
    };
    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_citation_for_unknown_message_is_not_found() {
    let (app, _) = create_test_app(MockProvider::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/citations",
            json!({ "messageId": "018f4e2a-0000-7000-8000-000000000000", "text": "orphan" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookmark() {
    let (app, store) = create_test_app(MockProvider::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/bookmarks",
            json!({ "sourceTitle": "Esvelt 2014" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bookmarks = store.lock().unwrap().list_bookmarks().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].note.as_deref(), Some("Citation from: Esvelt 2014"));
}
