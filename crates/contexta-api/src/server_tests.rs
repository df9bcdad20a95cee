use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use super::*;
use contexta_protocols::{
    CandidateSnippet, ClassificationBackend, ClassifierError, KeywordSearch, LabelScore, LabelSet,
    RetrievalError, VectorQuery, VectorSearch,
};
use contexta_runtime::{AnswerComposer, Classifier, Orchestrator};

struct EmptyIndex;

#[async_trait]
impl KeywordSearch for EmptyIndex {
    fn id(&self) -> &str {
        "empty"
    }

    async fn search(&self, _text: &str, _limit: usize) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl VectorSearch for EmptyIndex {
    fn id(&self) -> &str {
        "empty"
    }

    async fn search(&self, _query: VectorQuery, _limit: usize) -> Result<Vec<CandidateSnippet>, RetrievalError> {
        Ok(Vec::new())
    }
}

struct NoLabels;

#[async_trait]
impl ClassificationBackend for NoLabels {
    fn id(&self) -> &str {
        "none"
    }

    async fn score(&self, _text: &str, _labels: &LabelSet) -> Result<Vec<LabelScore>, ClassifierError> {
        Ok(Vec::new())
    }
}

fn state() -> Arc<AppState> {
    let orchestrator = Orchestrator::new(
        Arc::new(EmptyIndex),
        Arc::new(EmptyIndex),
        Classifier::new(Arc::new(NoLabels), LabelSet::default()),
        AnswerComposer::without_synthesis(),
    );
    Arc::new(AppState::new(Arc::new(orchestrator)))
}

#[test]
fn test_interface_config_default() {
    let config = InterfaceConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8002);
    assert_eq!(config.socket_addr().unwrap().port(), 8002);
}

#[test]
fn test_invalid_host_rejected() {
    let err = InterfaceConfig::new("not a host", 80).socket_addr().unwrap_err();
    assert!(matches!(err, ServeError::InvalidAddress { .. }));
    assert!(err.to_string().contains("not a host:80"));
}

#[tokio::test]
async fn test_serves_health_over_tcp_and_shuts_down() {
    let server = InterfaceServer::new(InterfaceConfig::new("127.0.0.1", 0), state());
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"));
    assert!(raw.contains("\"healthy\""));

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
