//! Error types for the contexta protocol layer.

mod classifier;
mod embedding;
mod pipeline;
mod retrieval;
mod synthesis;
mod tool;

pub use classifier::*;
pub use embedding::*;
pub use pipeline::*;
pub use retrieval::*;
pub use synthesis::*;
pub use tool::*;
