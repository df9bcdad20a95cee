//! OpenAI chat-completions synthesis provider for contexta.

mod api;
mod provider;

pub use provider::{OpenAISynthesis, OpenAISynthesisConfig};
