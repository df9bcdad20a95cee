//! Sports data tool for contexta.
//!
//! [`SportsToolClient`] implements [`ToolClient`](contexta_protocols::ToolClient)
//! over the sports service's HTTP endpoints:
//!
//! - `sports_search` -> `POST /mcp/sports-search`
//! - `latest_events` -> `POST /mcp/latest-events`

mod client;
mod wire;

pub use client::{SportsToolClient, SportsToolConfig};
