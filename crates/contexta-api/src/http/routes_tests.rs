use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use super::*;
use contexta_protocols::{
    CandidateSnippet, ClassificationBackend, ClassifierError, KeywordSearch, LabelScore, LabelSet,
    Origin, RetrievalError, SynthesisError, SynthesisProvider, SynthesisRequest, VectorQuery,
    VectorSearch,
};
use contexta_runtime::{AnswerComposer, Classifier, Orchestrator};

struct Keyword(bool);

#[async_trait]
impl KeywordSearch for Keyword {
    fn id(&self) -> &str {
        "keyword"
    }

    async fn search(&self, _text: &str, _limit: usize) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        if self.0 {
            Ok(vec![CandidateSnippet::new(
                "doc-1",
                "industry_news",
                "Paris is the capital of France.",
                Origin::Keyword,
                4.2,
            )])
        } else {
            Err(RetrievalError::IndexUnavailable("offline".to_string()))
        }
    }
}

struct Vector(bool);

#[async_trait]
impl VectorSearch for Vector {
    fn id(&self) -> &str {
        "vector"
    }

    async fn search(&self, _query: VectorQuery, _limit: usize) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        if self.0 {
            Ok(Vec::new())
        } else {
            Err(RetrievalError::IndexUnavailable("offline".to_string()))
        }
    }
}

struct Labels;

#[async_trait]
impl ClassificationBackend for Labels {
    fn id(&self) -> &str {
        "labels"
    }

    async fn score(&self, _text: &str, _labels: &LabelSet) -> Result<Vec<LabelScore>, ClassifierError> {
        Ok(vec![LabelScore::new("industry news", 0.8)])
    }
}

struct Echo;

#[async_trait]
impl SynthesisProvider for Echo {
    fn id(&self) -> &str {
        "echo"
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<String, SynthesisError> {
        Ok(format!("Answer to: {}", request.query))
    }
}

fn router(backends_up: bool, synthesis: bool) -> Router {
    let composer = if synthesis {
        AnswerComposer::new(Arc::new(Echo))
    } else {
        AnswerComposer::without_synthesis()
    };
    let orchestrator = Orchestrator::new(
        Arc::new(Keyword(backends_up)),
        Arc::new(Vector(backends_up)),
        Classifier::new(Arc::new(Labels), LabelSet::default()),
        composer,
    );
    create_router(Arc::new(AppState::new(Arc::new(orchestrator))))
}

fn post_query(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_query_endpoint() {
    let response = router(true, true)
        .oneshot(post_query(serde_json::json!({
            "query": "What is the capital of France?",
            "session_id": "s-1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["query"], "What is the capital of France?");
    assert_eq!(body["answer"], "Answer to: What is the capital of France?");
    assert!(body["tool_response"].is_null());
    assert!(body.get("degradations").is_none());
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    for body in [serde_json::json!({"query": "   "}), serde_json::json!({})] {
        let response = router(true, true).oneshot(post_query(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("empty"));
    }
}

#[tokio::test]
async fn test_total_outage_is_service_unavailable() {
    let response = router(false, false)
        .oneshot(post_query(serde_json::json!({"query": "Anything at all?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn test_degraded_synthesis_still_ok() {
    let response = router(true, false)
        .oneshot(post_query(serde_json::json!({"query": "What is the capital of France?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["degradations"][0], "synthesis_unavailable");
    assert!(body["answer"].as_str().unwrap().contains("Paris"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = router(true, true)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "contexta");
}

#[tokio::test]
async fn test_banner_endpoint() {
    let response = router(true, true)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route() {
    let response = router(true, true)
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_query_counters_reported_by_health() {
    let orchestrator = Orchestrator::new(
        Arc::new(Keyword(true)),
        Arc::new(Vector(true)),
        Classifier::new(Arc::new(Labels), LabelSet::default()),
        AnswerComposer::without_synthesis(),
    );
    let state = Arc::new(AppState::new(Arc::new(orchestrator)));
    let app = create_router(state.clone());

    for query in ["one", "two", "  "] {
        app.clone()
            .oneshot(post_query(serde_json::json!({"query": query})))
            .await
            .unwrap();
    }

    let stats = state.stats();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.answered, 2);
    assert_eq!(stats.degraded, 2);
    assert_eq!(stats.failed, 1);
    assert!(state.uptime() < Duration::from_secs(60));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["queries"]["received"], 3);
    assert_eq!(body["queries"]["degraded"], 2);
    assert_eq!(body["queries"]["failed"], 1);
}

#[tokio::test]
async fn test_malformed_body_answers_detail_and_counts_failed() {
    let orchestrator = Orchestrator::new(
        Arc::new(Keyword(true)),
        Arc::new(Vector(true)),
        Classifier::new(Arc::new(Labels), LabelSet::default()),
        AnswerComposer::without_synthesis(),
    );
    let state = Arc::new(AppState::new(Arc::new(orchestrator)));
    let app = create_router(state.clone());

    let bodies = [
        ("application/json", "not json"),
        ("application/json", r#"{"query": 42}"#),
        ("text/plain", r#"{"query": "hello"}"#),
    ];
    for (content_type, raw) in bodies {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header("content-type", content_type)
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {raw}");
        let body = json_body(response).await;
        assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
    }

    let stats = state.stats();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.answered, 0);
}

#[tokio::test]
async fn test_failed_query_counted() {
    let orchestrator = Orchestrator::new(
        Arc::new(Keyword(false)),
        Arc::new(Vector(false)),
        Classifier::new(Arc::new(Labels), LabelSet::default()),
        AnswerComposer::without_synthesis(),
    );
    let state = Arc::new(AppState::new(Arc::new(orchestrator)));
    create_router(state.clone())
        .oneshot(post_query(serde_json::json!({"query": "anything"})))
        .await
        .unwrap();

    assert_eq!(state.stats().failed, 1);
    assert_eq!(state.stats().answered, 0);
}
