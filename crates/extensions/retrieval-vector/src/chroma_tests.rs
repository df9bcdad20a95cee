use super::*;
use crate::SimpleHashEmbedding;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

async fn mount_collection(server: &MockServer, name: &str, id: &str, body: serde_json::Value) {
    Mock::given(matchers::method("GET"))
        .and(matchers::path(format!("/api/v1/collections/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": id, "name": name})))
        .mount(server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(format!("/api/v1/collections/{}/query", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn adapter(server: &MockServer, collections: &[&str]) -> ChromaVectorSearch {
    ChromaVectorSearch::new(
        ChromaConfig {
            base_url: server.uri(),
            collections: collections.iter().map(|c| c.to_string()).collect(),
            timeout: Duration::from_secs(2),
        },
        Arc::new(SimpleHashEmbedding::new(16)),
    )
}

#[test]
fn test_distance_to_similarity() {
    assert_eq!(distance_to_similarity(0.0), 1.0);
    assert_eq!(distance_to_similarity(1.0), 0.5);
    assert_eq!(distance_to_similarity(-1.0), 0.0);
    assert_eq!(distance_to_similarity(f32::NAN), 0.0);
}

#[tokio::test]
async fn test_search_merges_collections() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "broadcast_transcripts",
        "c-1",
        serde_json::json!({
            "ids": [["t-1", "t-2"]],
            "documents": [["Lakers recap", "Weather segment"]],
            "metadatas": [[{"source": "CNN", "category": "sports", "date": "2024-03-01", "speaker": "Anchor"}, null]],
            "distances": [[0.25, 3.0]]
        }),
    )
    .await;
    mount_collection(
        &server,
        "industry_news",
        "c-2",
        serde_json::json!({
            "ids": [["n-1"]],
            "documents": [["Streaming rights deal"]],
            "metadatas": [[{"source": "Variety", "tags": "rights, streaming"}]],
            "distances": [[1.0]]
        }),
    )
    .await;

    let adapter = adapter(&server, &["broadcast_transcripts", "industry_news"]);
    let results = adapter.search("Lakers".into(), 5).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["t-1", "n-1", "t-2"]);
    assert!((results[0].score - 0.8).abs() < 1e-6);
    assert_eq!(results[0].collection, "broadcast_transcripts");
    assert_eq!(results[0].metadata.source.as_deref(), Some("CNN"));
    assert!(results[0].metadata.date.is_some());
    assert!(results[0].metadata.extra("speaker").is_some());
    assert_eq!(results[1].metadata.tags, vec!["rights".to_string(), "streaming".to_string()]);
    assert!(results.iter().all(|s| s.origin == Origin::Vector));
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "technical_docs",
        "c-3",
        serde_json::json!({
            "ids": [["d-1", "d-2", "d-3"]],
            "documents": [["a", "b", "c"]],
            "distances": [[0.1, 0.2, 0.3]]
        }),
    )
    .await;

    let results = adapter(&server, &["technical_docs"])
        .search("encoder settings".into(), 2)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "d-1");
}

#[tokio::test]
async fn test_failed_collection_is_skipped() {
    let server = MockServer::start().await;
    mount_collection(
        &server,
        "technical_docs",
        "c-3",
        serde_json::json!({"ids": [["d-1"]], "documents": [["doc"]], "distances": [[0.5]]}),
    )
    .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/v1/collections/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let results = adapter(&server, &["missing", "technical_docs"])
        .search("doc".into(), 5)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_all_collections_failing_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = adapter(&server, &["a", "b"])
        .search("doc".into(), 5)
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::IndexUnavailable(_)));
}

#[tokio::test]
async fn test_collection_id_is_cached() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/v1/collections/technical_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "c-3"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/v1/collections/c-3/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ids": [[]]})))
        .expect(2)
        .mount(&server)
        .await;

    let adapter = adapter(&server, &["technical_docs"]);
    adapter.search("one".into(), 3).await.unwrap();
    adapter.search("two".into(), 3).await.unwrap();
}
