//! Remote annotation delegate
//!
//! POSTs `{ "content": ... }` to an endpoint that answers with
//! `{ "sentiment", "complexity", "keyTerms" }`. [`RemoteAnnotator::annotate`]
//! absorbs every failure and substitutes [`AnnotatedText::neutral`].

use crate::config::RemoteAnnotatorConfig;
use crate::error::AnnotatorError;
use scholar_domain::AnnotatedText;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    content: &'a str,
}

/// Client for a remote annotation service
#[derive(Debug, Clone)]
pub struct RemoteAnnotator {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteAnnotator {
    /// Create a client with the configured per-request timeout
    pub fn new(config: &RemoteAnnotatorConfig) -> Result<Self, AnnotatorError> {
        config.validate().map_err(AnnotatorError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AnnotatorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Annotate remotely, reporting any failure
    pub async fn try_annotate(&self, text: &str) -> Result<AnnotatedText, AnnotatorError> {
        debug!(endpoint = %self.endpoint, len = text.len(), "Sending remote annotation request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnnotateRequest { content: text })
            .send()
            .await
            .map_err(|e| AnnotatorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnnotatorError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AnnotatorError::Transport(e.to_string()))?;
        let annotation: AnnotatedText = serde_json::from_slice(&body)
            .map_err(|e| AnnotatorError::MalformedResponse(e.to_string()))?;

        if !annotation.is_within_bounds() {
            return Err(AnnotatorError::OutOfRange(format!(
                "sentiment={}, complexity={}, key_terms={}",
                annotation.sentiment,
                annotation.complexity,
                annotation.key_terms.len()
            )));
        }

        Ok(annotation)
    }

    /// Annotate remotely, falling back to neutral scores on any failure
    pub async fn annotate(&self, text: &str) -> AnnotatedText {
        match self.try_annotate(text).await {
            Ok(annotation) => annotation,
            Err(e) => {
                warn!(endpoint = %self.endpoint, "Remote annotation failed, using neutral defaults: {}", e);
                AnnotatedText::neutral()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/analyze", addr)
    }

    fn client(endpoint: String) -> RemoteAnnotator {
        RemoteAnnotator::new(&RemoteAnnotatorConfig {
            endpoint,
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_remote_success() {
        let app = Router::new().route(
            "/analyze",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["content"], "hello world");
                Json(serde_json::json!({
                    "sentiment": 0.8,
                    "complexity": 0.3,
                    "keyTerms": ["hello", "world"]
                }))
            }),
        );
        let remote = client(serve(app).await);

        let out = remote.try_annotate("hello world").await.unwrap();
        assert_eq!(out.sentiment, 0.8);
        assert_eq!(out.key_terms, vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_neutral() {
        let app = Router::new().route(
            "/analyze",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let remote = client(serve(app).await);

        assert!(matches!(
            remote.try_annotate("text").await,
            Err(AnnotatorError::Status(500))
        ));
        assert_eq!(remote.annotate("text").await, AnnotatedText::neutral());
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back_to_neutral() {
        let app = Router::new().route(
            "/analyze",
            post(|| async { Json(serde_json::json!({ "error": "nope" })) }),
        );
        let remote = client(serve(app).await);

        assert!(matches!(
            remote.try_annotate("text").await,
            Err(AnnotatorError::MalformedResponse(_))
        ));
        assert_eq!(remote.annotate("text").await, AnnotatedText::neutral());
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_rejected() {
        let app = Router::new().route(
            "/analyze",
            post(|| async {
                Json(serde_json::json!({ "sentiment": 1.7, "complexity": 0.2, "keyTerms": [] }))
            }),
        );
        let remote = client(serve(app).await);

        assert!(matches!(
            remote.try_annotate("text").await,
            Err(AnnotatorError::OutOfRange(_))
        ));
        assert_eq!(remote.annotate("text").await, AnnotatedText::neutral());
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let app = Router::new().route(
            "/analyze",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(AnnotatedText::empty())
            }),
        );
        let remote = RemoteAnnotator::new(&RemoteAnnotatorConfig {
            endpoint: serve(app).await,
            timeout_secs: 1,
        })
        .unwrap();

        assert!(matches!(
            remote.try_annotate("text").await,
            Err(AnnotatorError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back_to_neutral() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let remote = client(format!("http://{}/analyze", addr));
        assert_eq!(remote.annotate("text").await, AnnotatedText::neutral());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RemoteAnnotator::new(&RemoteAnnotatorConfig {
            endpoint: "not a url".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(AnnotatorError::Config(_))));
    }
}
