//! Tool responses as recorded on the assistant response.

use serde::{Deserialize, Serialize};

use super::payload::ToolPayload;
use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    Unavailable,
    Timeout,
    Error,
}

/// A typed tool failure with a stable reason code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    pub reason_code: String,
    pub message: String,
}

impl From<&ToolError> for ToolFailure {
    fn from(err: &ToolError) -> Self {
        let kind = match err {
            ToolError::Unavailable(_) => ToolFailureKind::Unavailable,
            ToolError::Timeout(_) => ToolFailureKind::Timeout,
            ToolError::Remote { .. } | ToolError::InvalidRequest(_) => ToolFailureKind::Error,
        };
        Self {
            kind,
            reason_code: err.reason_code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { payload: ToolPayload },
    Failure { failure: ToolFailure },
}

/// The outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool: String,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolResponse {
    pub fn from_result(tool: impl Into<String>, result: Result<ToolPayload, ToolError>) -> Self {
        let outcome = match result {
            Ok(payload) => ToolOutcome::Success { payload },
            Err(err) => ToolOutcome::Failure {
                failure: ToolFailure::from(&err),
            },
        };
        Self {
            tool: tool.into(),
            outcome,
        }
    }

    pub fn payload(&self) -> Option<&ToolPayload> {
        match &self.outcome {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Failure { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match &self.outcome {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Failure { failure } => Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.payload().is_some()
    }
}
