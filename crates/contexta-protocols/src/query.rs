//! The query value passed through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A natural-language query.
///
/// Created once at request entry and then shared by reference; fields are
/// private so nothing downstream can change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    issued_at: DateTime<Utc>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            session_id: None,
            issued_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Unique id used to correlate log lines for this query.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
