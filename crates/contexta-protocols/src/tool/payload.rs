//! Typed success payloads, one shape per tool.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept a string, a number or null for loosely typed upstream fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// An entity returned by the sports search operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SportsEntity {
    Team {
        #[serde(default, deserialize_with = "lenient_string")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        sport: Option<String>,
        #[serde(default)]
        league: Option<String>,
        #[serde(default)]
        country: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        website: Option<String>,
    },
    Player {
        #[serde(default, deserialize_with = "lenient_string")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        team: Option<String>,
        #[serde(default)]
        sport: Option<String>,
        #[serde(default)]
        nationality: Option<String>,
        #[serde(default)]
        position: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl SportsEntity {
    pub fn name(&self) -> &str {
        match self {
            SportsEntity::Team { name, .. } | SportsEntity::Player { name, .. } => name,
        }
    }
}

/// Result of a sports search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportsSearchPayload {
    pub query: String,
    #[serde(default)]
    pub results: Vec<SportsEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Completed,
    Upcoming,
}

/// A single fixture or result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportsEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Event date as reported upstream (usually YYYY-MM-DD).
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    pub status: EventStatus,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub home_score: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub away_score: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
}

impl SportsEvent {
    /// "Home vs Away", falling back to the event name.
    pub fn matchup(&self) -> String {
        match (&self.home_team, &self.away_team) {
            (Some(home), Some(away)) => format!("{} vs {}", home, away),
            _ => self.name.clone().unwrap_or_else(|| "Unknown event".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Recent results and upcoming fixtures for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEventsPayload {
    pub team_info: TeamInfo,
    #[serde(default)]
    pub events: Vec<SportsEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TeamEventsPayload {
    pub fn completed(&self) -> impl Iterator<Item = &SportsEvent> {
        self.events
            .iter()
            .filter(|e| e.status == EventStatus::Completed)
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &SportsEvent> {
        self.events
            .iter()
            .filter(|e| e.status == EventStatus::Upcoming)
    }
}

/// Success payload of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ToolPayload {
    SportsSearch(SportsSearchPayload),
    TeamEvents(TeamEventsPayload),
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
