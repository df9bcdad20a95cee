//! External tool request/response contracts.

mod payload;
mod request;
mod response;

pub use payload::*;
pub use request::*;
pub use response::*;

use async_trait::async_trait;

use crate::error::ToolError;

/// Tool name for the sports entity search operation.
pub const SPORTS_SEARCH: &str = "sports_search";

/// Tool name for the team events lookup operation.
pub const LATEST_EVENTS: &str = "latest_events";

/// Client for an external data tool service.
#[async_trait]
pub trait ToolClient: Send + Sync {
    /// Client identifier used in logs.
    fn id(&self) -> &str;

    /// Invoke the tool named by `request`.
    ///
    /// Implementations apply their own timeout and concurrency limits.
    async fn invoke(&self, request: &ToolRequest) -> Result<ToolPayload, ToolError>;
}
