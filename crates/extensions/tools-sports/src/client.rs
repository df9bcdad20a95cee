//! HTTP client for the sports data service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use contexta_protocols::{
    EventStatus, SportsEvent, TeamEventsPayload, ToolClient, ToolError, ToolPayload, ToolRequest,
    LATEST_EVENTS, SPORTS_SEARCH,
};

use crate::wire::{self, EventsBody, SearchBody};

/// Sports service connection settings.
#[derive(Debug, Clone)]
pub struct SportsToolConfig {
    pub base_url: String,
    /// Bound on one attempt, including the wait for a slot.
    pub timeout: Duration,
    /// Requests in flight across all queries sharing this client.
    pub max_in_flight: usize,
    pub retry_on_unavailable: bool,
}

impl Default for SportsToolConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(5),
            max_in_flight: 8,
            retry_on_unavailable: true,
        }
    }
}

/// Which events a `latest_events` caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Past,
    Upcoming,
    All,
}

impl Window {
    fn parse(value: Option<&str>) -> Result<Self, ToolError> {
        match value {
            None | Some("all") => Ok(Window::All),
            Some("past") => Ok(Window::Past),
            Some("upcoming") => Ok(Window::Upcoming),
            Some(other) => Err(ToolError::InvalidRequest(format!("unknown window '{}'", other))),
        }
    }

    fn admits(&self, status: EventStatus) -> bool {
        match self {
            Window::Past => status == EventStatus::Completed,
            Window::Upcoming => status == EventStatus::Upcoming,
            Window::All => true,
        }
    }
}

/// A validated call, ready to send.
enum Call {
    Search { query: String },
    Events { body: EventsBody, window: Window, league: Option<String> },
}

impl Call {
    fn from_request(request: &ToolRequest) -> Result<Self, ToolError> {
        match request.tool.as_str() {
            SPORTS_SEARCH => {
                let query = request
                    .text_param("query")
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| ToolError::InvalidRequest("sports_search needs 'query'".to_string()))?;
                Ok(Call::Search {
                    query: query.to_string(),
                })
            }
            LATEST_EVENTS => {
                let body = EventsBody {
                    team_id: request.param("team_id").map(|v| v.to_string()),
                    team_name: request.text_param("team_name").map(str::to_string),
                };
                if body.team_id.is_none() && body.team_name.is_none() {
                    return Err(ToolError::InvalidRequest(
                        "latest_events needs 'team_id' or 'team_name'".to_string(),
                    ));
                }
                Ok(Call::Events {
                    body,
                    window: Window::parse(request.text_param("window"))?,
                    league: request.text_param("league").map(str::to_string),
                })
            }
            other => Err(ToolError::InvalidRequest(format!("unknown tool '{}'", other))),
        }
    }
}

/// [`ToolClient`] over the sports service.
///
/// Clones share one in-flight cap, so the limit holds across every query
/// using the client.
#[derive(Clone)]
pub struct SportsToolClient {
    client: reqwest::Client,
    config: SportsToolConfig,
    permits: Arc<Semaphore>,
}

impl SportsToolClient {
    pub fn new(config: SportsToolConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        Self {
            client: reqwest::Client::new(),
            config,
            permits,
        }
    }

    pub fn config(&self) -> &SportsToolConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/mcp/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout.as_millis() as u64
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ToolError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ToolError::Unavailable(e.to_string()))?;

        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(wire::status_error(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn attempt(&self, call: &Call) -> Result<ToolPayload, ToolError> {
        let work = async {
            match call {
                Call::Search { query } => {
                    let body = self.post("sports-search", &SearchBody { query }).await?;
                    wire::parse_search(&body, query).map(ToolPayload::SportsSearch)
                }
                Call::Events { body, window, league } => {
                    let text = self.post("latest-events", body).await?;
                    let payload = wire::parse_events(&text)?;
                    Ok(ToolPayload::TeamEvents(select_events(payload, *window, league.as_deref())))
                }
            }
        };

        tokio::time::timeout(self.config.timeout, work)
            .await
            .unwrap_or(Err(ToolError::Timeout(self.timeout_ms())))
    }
}

#[async_trait]
impl ToolClient for SportsToolClient {
    fn id(&self) -> &str {
        "sports"
    }

    async fn invoke(&self, request: &ToolRequest) -> Result<ToolPayload, ToolError> {
        let call = Call::from_request(request)?;

        match self.attempt(&call).await {
            Err(err) if err.is_retryable() && self.config.retry_on_unavailable => {
                warn!(tool = %request.tool, error = %err, "Sports service unavailable, retrying once");
                self.attempt(&call).await
            }
            outcome => {
                debug!(tool = %request.tool, ok = outcome.is_ok(), "Sports tool call finished");
                outcome
            }
        }
    }
}

/// Apply the window and league filters, then order the events: completed
/// newest first, upcoming soonest first.
///
/// A league filter that would leave nothing is ignored.
fn select_events(mut payload: TeamEventsPayload, window: Window, league: Option<&str>) -> TeamEventsPayload {
    let mut events: Vec<SportsEvent> = std::mem::take(&mut payload.events)
        .into_iter()
        .filter(|e| window.admits(e.status))
        .collect();

    if let Some(league) = league {
        let in_league: Vec<SportsEvent> = events
            .iter()
            .filter(|e| {
                e.league
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(league))
            })
            .cloned()
            .collect();
        if in_league.is_empty() {
            debug!(league, "No events in requested league, keeping all");
        } else {
            events = in_league;
        }
    }

    let (mut completed, mut upcoming): (Vec<_>, Vec<_>) = events
        .into_iter()
        .partition(|e| e.status == EventStatus::Completed);
    completed.sort_by(|a, b| b.date.cmp(&a.date));
    upcoming.sort_by(|a, b| a.date.cmp(&b.date));

    completed.extend(upcoming);
    payload.events = completed;
    payload
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
