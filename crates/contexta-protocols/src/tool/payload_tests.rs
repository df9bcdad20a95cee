use super::*;
use serde_json::json;

#[test]
fn test_search_payload_from_service_json() {
    let body = json!({
        "query": "Lakers",
        "source": "TheSportsDB",
        "results": [
            {"type": "team", "id": "134867", "name": "Los Angeles Lakers",
             "sport": "Basketball", "league": "NBA", "country": "USA",
             "description": "...", "logo": null, "website": "www.nba.com/lakers"},
            {"type": "player", "id": 34145937, "name": "LeBron James",
             "team": "Los Angeles Lakers", "sport": "Basketball",
             "nationality": "USA", "position": "Small Forward", "thumb": null}
        ]
    });
    let payload: SportsSearchPayload = serde_json::from_value(body).unwrap();

    assert_eq!(payload.results.len(), 2);
    assert_eq!(payload.results[0].name(), "Los Angeles Lakers");
    match &payload.results[1] {
        SportsEntity::Player { id, position, .. } => {
            assert_eq!(id.as_deref(), Some("34145937"));
            assert_eq!(position.as_deref(), Some("Small Forward"));
        }
        other => panic!("expected player, got {:?}", other),
    }
}

#[test]
fn test_events_payload_lenient_scores() {
    let body = json!({
        "team_info": {"id": "134867", "name": "Los Angeles Lakers", "sport": "Basketball",
                      "league": "NBA", "country": "USA"},
        "events": [
            {"id": "1", "name": "Lakers vs Celtics", "date": "2024-03-01", "time": "19:30:00",
             "status": "completed", "home_team": "Los Angeles Lakers", "away_team": "Boston Celtics",
             "home_score": "112", "away_score": 108, "venue": "Crypto.com Arena", "league": "NBA"},
            {"id": "2", "name": "Warriors vs Lakers", "date": "2024-03-09", "time": null,
             "status": "upcoming", "home_team": "Golden State Warriors",
             "away_team": "Los Angeles Lakers", "venue": "Chase Center", "league": "NBA"}
        ]
    });
    let payload: TeamEventsPayload = serde_json::from_value(body).unwrap();

    assert_eq!(payload.events[0].home_score.as_deref(), Some("112"));
    assert_eq!(payload.events[0].away_score.as_deref(), Some("108"));
    assert!(payload.events[1].home_score.is_none());
    assert_eq!(payload.completed().count(), 1);
    assert_eq!(payload.upcoming().count(), 1);
    assert_eq!(payload.events[1].matchup(), "Golden State Warriors vs Los Angeles Lakers");
}

#[test]
fn test_tool_payload_tagging() {
    let payload = ToolPayload::SportsSearch(SportsSearchPayload {
        query: "Arsenal".to_string(),
        results: vec![],
        source: None,
    });
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["kind"], "sports_search");
    assert_eq!(json["data"]["query"], "Arsenal");
}
