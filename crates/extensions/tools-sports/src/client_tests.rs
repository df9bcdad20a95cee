use super::*;
use serde_json::json;
use std::time::Instant;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SportsToolClient {
    SportsToolClient::new(SportsToolConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
}

fn events_body() -> serde_json::Value {
    json!({
        "source": "TheSportsDB",
        "team_info": {"id": "134867", "name": "Los Angeles Lakers", "sport": "Basketball", "league": "NBA"},
        "events": [
            {"id": "1", "date": "2024-02-20", "status": "completed", "league": "NBA",
             "home_team": "Los Angeles Lakers", "away_team": "Boston Celtics",
             "home_score": 101, "away_score": 99},
            {"id": "2", "date": "2024-03-01", "status": "completed", "league": "NBA",
             "home_team": "Los Angeles Lakers", "away_team": "Denver Nuggets",
             "home_score": "110", "away_score": "99"},
            {"id": "3", "date": "2024-03-15", "status": "upcoming", "league": "NBA",
             "home_team": "Los Angeles Lakers", "away_team": "Phoenix Suns"},
            {"id": "4", "date": "2024-03-09", "status": "upcoming", "league": "NBA Preseason",
             "home_team": "Golden State Warriors", "away_team": "Los Angeles Lakers"}
        ]
    })
}

fn ids(payload: &ToolPayload) -> Vec<String> {
    match payload {
        ToolPayload::TeamEvents(p) => p.events.iter().filter_map(|e| e.id.clone()).collect(),
        other => panic!("expected events, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sports_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/sports-search"))
        .and(body_json(json!({"query": "Lakers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "Lakers",
            "source": "TheSportsDB",
            "results": [{"type": "team", "id": 134867, "name": "Los Angeles Lakers", "league": "NBA"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "Lakers");
    let payload = client(&server).invoke(&request).await.unwrap();

    match payload {
        ToolPayload::SportsSearch(search) => {
            assert_eq!(search.results.len(), 1);
            assert_eq!(search.results[0].name(), "Los Angeles Lakers");
            assert_eq!(search.source.as_deref(), Some("TheSportsDB"));
        }
        other => panic!("expected search, got {:?}", other),
    }
}

#[tokio::test]
async fn test_latest_events_all_sorted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/latest-events"))
        .and(body_json(json!({"team_name": "Lakers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = ToolRequest::new(LATEST_EVENTS).with_param("team_name", "Lakers");
    let payload = client(&server).invoke(&request).await.unwrap();

    assert_eq!(ids(&payload), vec!["2", "1", "4", "3"]);
}

#[tokio::test]
async fn test_latest_events_window_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/latest-events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;
    let client = client(&server);

    let upcoming = ToolRequest::new(LATEST_EVENTS)
        .with_param("team_name", "Lakers")
        .with_param("window", "upcoming");
    assert_eq!(ids(&client.invoke(&upcoming).await.unwrap()), vec!["4", "3"]);

    let past = ToolRequest::new(LATEST_EVENTS)
        .with_param("team_name", "Lakers")
        .with_param("window", "past");
    assert_eq!(ids(&client.invoke(&past).await.unwrap()), vec!["2", "1"]);
}

#[tokio::test]
async fn test_league_filter_falls_back_when_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/latest-events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;
    let client = client(&server);

    let preseason = ToolRequest::new(LATEST_EVENTS)
        .with_param("team_name", "Lakers")
        .with_param("league", "nba preseason");
    assert_eq!(ids(&client.invoke(&preseason).await.unwrap()), vec!["4"]);

    let unknown = ToolRequest::new(LATEST_EVENTS)
        .with_param("team_name", "Lakers")
        .with_param("league", "EuroLeague");
    assert_eq!(ids(&client.invoke(&unknown).await.unwrap()).len(), 4);
}

#[tokio::test]
async fn test_team_id_sent_as_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/latest-events"))
        .and(body_json(json!({"team_id": "134867"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = ToolRequest::new(LATEST_EVENTS).with_param("team_id", 134867i64);
    assert!(client(&server).invoke(&request).await.is_ok());
}

#[tokio::test]
async fn test_not_found_maps_to_remote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp/latest-events"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Team not found: Nowhere FC"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ToolRequest::new(LATEST_EVENTS).with_param("team_name", "Nowhere FC");
    let err = client(&server).invoke(&request).await.unwrap_err();

    assert_eq!(err.reason_code(), "not_found");
    assert!(err.to_string().contains("Nowhere FC"));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Error searching sports data"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "Lakers");
    let err = client(&server).invoke(&request).await.unwrap_err();
    assert_eq!(err.reason_code(), "upstream_error");
}

#[tokio::test]
async fn test_garbage_body_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "Lakers");
    let err = client(&server).invoke(&request).await.unwrap_err();
    assert_eq!(err.reason_code(), "invalid_payload");
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = SportsToolClient::new(SportsToolConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    });
    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "Lakers");

    let started = Instant::now();
    let err = client.invoke(&request).await.unwrap_err();
    assert!(matches!(err, ToolError::Timeout(200)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_unreachable_retried_once_then_surfaced() {
    let client = SportsToolClient::new(SportsToolConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(1),
        ..Default::default()
    });
    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "Lakers");

    let err = client.invoke(&request).await.unwrap_err();
    assert!(matches!(err, ToolError::Unavailable(_)));
}

#[tokio::test]
async fn test_invalid_requests_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client(&server);

    for request in [
        ToolRequest::new("weather").with_param("query", "Paris"),
        ToolRequest::new(SPORTS_SEARCH),
        ToolRequest::new(SPORTS_SEARCH).with_param("query", "  "),
        ToolRequest::new(LATEST_EVENTS).with_param("window", "past"),
        ToolRequest::new(LATEST_EVENTS)
            .with_param("team_name", "Lakers")
            .with_param("window", "someday"),
    ] {
        let err = client.invoke(&request).await.unwrap_err();
        assert_eq!(err.reason_code(), "invalid_request", "request {:?}", request);
    }
}

#[tokio::test]
async fn test_in_flight_cap_shared_across_clones() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"query": "x", "results": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let first = SportsToolClient::new(SportsToolConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        max_in_flight: 1,
        ..Default::default()
    });
    let second = first.clone();
    let request = ToolRequest::new(SPORTS_SEARCH).with_param("query", "x");

    let started = Instant::now();
    let (a, b) = tokio::join!(first.invoke(&request), second.invoke(&request));
    assert!(a.is_ok() && b.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(600));
}
