//! # Contexta API
//!
//! HTTP surface for the query pipeline.
//!
//! ```text
//! POST /query   - answer a query
//! GET  /health  - health check
//! GET  /        - service banner
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::handlers::{QueryRequest, SERVICE_NAME};
pub use http::routes::create_router;
pub use server::{InterfaceConfig, InterfaceServer, ServeError};
pub use state::{AppState, Outcome, QueryStats};
