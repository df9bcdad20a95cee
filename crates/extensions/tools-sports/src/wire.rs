//! HTTP bodies exchanged with the sports service.

use serde::{Deserialize, Serialize};
use tracing::warn;

use contexta_protocols::{SportsEntity, SportsSearchPayload, TeamEventsPayload, TeamInfo, ToolError};

#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub query: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct EventsBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

/// Error body of the form `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    source: Option<String>,
}

/// Map a non-success status and its body onto a remote tool error.
pub(crate) fn status_error(status: u16, body: &str) -> ToolError {
    let code = match status {
        404 => "not_found",
        400 => "bad_request",
        _ => "upstream_error",
    };
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body.trim().to_string(),
    };
    ToolError::remote(code, message)
}

fn invalid_payload(err: impl std::fmt::Display) -> ToolError {
    ToolError::remote("invalid_payload", err.to_string())
}

/// Decode a search body, skipping entities that do not fit a known shape.
pub(crate) fn parse_search(body: &str, query: &str) -> Result<SportsSearchPayload, ToolError> {
    let raw: RawSearch = serde_json::from_str(body).map_err(invalid_payload)?;
    let results = raw
        .results
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<SportsEntity>(value) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(error = %e, "Skipping unrecognized sports entity");
                None
            }
        })
        .collect();

    Ok(SportsSearchPayload {
        query: raw.query.unwrap_or_else(|| query.to_string()),
        results,
        source: raw.source,
    })
}

pub(crate) fn parse_events(body: &str) -> Result<TeamEventsPayload, ToolError> {
    let payload: TeamEventsPayload = serde_json::from_str(body).map_err(invalid_payload)?;
    if payload.team_info == TeamInfo::default() {
        return Err(invalid_payload("missing team_info"));
    }
    Ok(payload)
}
